use query_filter_macros::Queryable;

#[derive(Queryable)]
pub struct Book {
    #[odata(indexed)]
    pub title: String,
}

fn main() {
    let book = Book { title: String::new() };
    let _ = book.title;
}
