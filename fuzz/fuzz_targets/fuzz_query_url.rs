#![no_main]

use libfuzzer_sys::fuzz_target;
use query_filter::{FieldMap, QueryFilter, QueryLimits};
use url::Url;

// A query that parses must survive serialization onto its URL unchanged.
fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut url) = Url::parse("https://fuzz.example/items") else {
        return;
    };
    url.set_query(Some(s));

    let fields = FieldMap::new()
        .insert("Title", "title")
        .insert("Rate", "rate");
    let limits = QueryLimits::default();

    if let Ok(query) = QueryFilter::parse_with(&url, &fields, &limits) {
        let again = QueryFilter::parse_with(&query.to_url(), &fields, &limits)
            .expect("serialized query must parse");
        assert_eq!(again.filter, query.filter);
        assert_eq!(again.order_by, query.order_by);
        assert_eq!(again.top, query.top);
        assert_eq!(again.skip, query.skip);
    }
});
