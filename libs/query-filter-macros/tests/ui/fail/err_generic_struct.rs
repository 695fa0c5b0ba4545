use query_filter_macros::Queryable;

#[derive(Queryable)]
pub struct Page<T> {
    #[odata(column = "items")]
    pub items: T,
}

fn main() {
    let page = Page { items: 1 };
    let _ = page.items;
}
