use query_filter::FieldMap;
use query_filter_macros::Queryable;

#[derive(Queryable)]
pub struct Entry {
    #[odata(column = "entry_type")]
    pub r#type: String,
}

fn main() {
    let map = FieldMap::of::<Entry>().unwrap();
    assert_eq!(map.column("Type"), Some("entry_type"));
}
