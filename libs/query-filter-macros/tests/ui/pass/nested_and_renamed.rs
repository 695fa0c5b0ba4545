use query_filter::FieldMap;
use query_filter_macros::Queryable;

#[derive(Queryable)]
pub struct Author {
    #[odata(column = "author_name")]
    pub name: String,
}

#[derive(Queryable)]
pub struct Book {
    #[odata(name = "Stars", column = "rate")]
    pub rate: i32,
    #[odata(nested)]
    pub author: Author,
}

fn main() {
    let map = FieldMap::of::<Book>().unwrap();
    assert_eq!(map.column("Stars"), Some("rate"));
    assert_eq!(map.column("Name"), Some("author_name"));
}
