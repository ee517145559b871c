//! Non-ASCII masking
//!
//! Every byte of a multi-byte UTF-8 character becomes `*`, so the output has
//! the same byte length as the input and ADI length prefixes stay valid. A
//! byte that is not part of valid UTF-8 becomes a single `*` as well.

use std::io::{self, BufRead, Write};

const STAR: u8 = b'*';

/// Copy `input` to `output`, masking non-ASCII bytes; returns the number masked
pub fn mask_non_ascii<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<u64> {
    let mut masked = 0u64;
    let mut chunk = Vec::new();
    loop {
        let buf = input.fill_buf()?;
        if buf.is_empty() {
            break;
        }
        chunk.clear();
        chunk.extend(buf.iter().map(|&b| if b.is_ascii() { b } else { STAR }));
        masked += buf.iter().filter(|b| !b.is_ascii()).count() as u64;
        let len = buf.len();
        input.consume(len);
        output.write_all(&chunk)?;
    }
    output.flush()?;
    tracing::debug!(masked, "masked non-ASCII bytes");
    Ok(masked)
}
