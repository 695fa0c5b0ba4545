#![no_main]

use libfuzzer_sys::fuzz_target;
use query_filter::{FieldMap, QueryLimits, parse_orderby};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 {
        return;
    }
    if let Ok(s) = std::str::from_utf8(data) {
        let fields = FieldMap::new()
            .insert("Title", "title")
            .insert("Rate", "rate");
        let _ = parse_orderby(s, &fields, &QueryLimits::default());
    }
});
