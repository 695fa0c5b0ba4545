use query_filter_macros::Queryable;

#[derive(Queryable)]
pub struct Pair(pub i32, pub i32);

fn main() {
    let pair = Pair(1, 2);
    let _ = pair.0 + pair.1;
}
