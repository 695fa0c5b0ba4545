use query_filter_macros::Queryable;

#[derive(Queryable)]
pub enum Status {
    Active,
}

fn main() {
    let _ = Status::Active;
}
