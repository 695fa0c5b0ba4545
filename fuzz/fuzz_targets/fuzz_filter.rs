#![no_main]

use libfuzzer_sys::fuzz_target;
use query_filter::{FieldMap, QueryLimits, parse_filter};

fuzz_target!(|data: &[u8]| {
    // Limit input size to avoid OOM on pathological inputs
    if data.len() > 4096 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let fields = FieldMap::new()
        .insert("Title", "title")
        .insert("Rate", "rate");

    if let Ok(Some(filter)) = parse_filter(s, &fields, &QueryLimits::default()) {
        let last = filter.nodes().last().map(|n| n.conjunction);
        assert_eq!(last, Some(None), "last predicate must not carry a conjunction");
        assert!(
            filter.nodes()[..filter.len() - 1]
                .iter()
                .all(|n| n.conjunction.is_some())
        );
    }
});
