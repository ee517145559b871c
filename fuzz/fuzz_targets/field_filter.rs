#![no_main]

use adiftools::filter::FieldFilter;
use adiftools::record::Record;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // First line is the pattern, the rest is the field value
        let (pattern, value) = input.split_once('\n').unwrap_or((input, ""));
        if let Ok(filter) = FieldFilter::new("call", pattern, false) {
            let _ = filter.selects(&Record::from_pairs([("call", value)]));
        }
    }
});
