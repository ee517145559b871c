#![no_main]

use adiftools::adi::AdiReader;
use adiftools::store::RecordSource;
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes either parse into records or stop with an error, never panic
    let mut reader = AdiReader::new(Cursor::new(data));
    while let Ok(Some(record)) = reader.read_record() {
        let _ = record.canonical_fields();
    }
});
