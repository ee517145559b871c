//! ADI (tagged text) reader and writer
//!
//! Fields are written as `<name:length>value`, where length counts bytes of
//! the value. An optional type indicator (`<name:length:type>`) is accepted
//! and dropped. `<eor>` closes a record, `<eoh>` closes the header.

use crate::record::Record;
use crate::store::{RecordSink, RecordSource};
use std::io::{BufRead, Read, Write};
use thiserror::Error;

/// ADIF version written into output headers
pub const ADIF_VERSION: &str = "3.1.4";

/// Program identifier written into output headers
pub const PROGRAM_ID: &str = "adiftools";

/// Errors raised while reading or writing ADI streams
#[derive(Error, Debug)]
pub enum AdiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unterminated tag at byte {offset}")]
    UnterminatedTag { offset: u64 },

    #[error("invalid length in tag <{tag}> at byte {offset}")]
    InvalidLength { tag: String, offset: u64 },

    #[error("value of field {field} truncated at byte {offset}")]
    Truncated { field: String, offset: u64 },

    #[error("value of field {field} is not valid UTF-8 (byte {offset})")]
    InvalidUtf8 { field: String, offset: u64 },
}

enum Tag {
    Field { name: String, value: String },
    EndOfRecord,
    EndOfHeader,
}

/// Streaming ADI reader
pub struct AdiReader<R: BufRead> {
    inner: R,
    offset: u64,
    count: usize,
    in_header: bool,
}

impl<R: BufRead> AdiReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            count: 0,
            in_header: true,
        }
    }

    fn next_tag(&mut self) -> Result<Option<Tag>, AdiError> {
        loop {
            let mut skipped = Vec::new();
            let n = self.inner.read_until(b'<', &mut skipped)?;
            self.offset += n as u64;
            if skipped.last() != Some(&b'<') {
                return Ok(None);
            }

            let tag_start = self.offset - 1;
            let mut tag_text = Vec::new();
            let n = self.inner.read_until(b'>', &mut tag_text)?;
            self.offset += n as u64;
            if tag_text.pop() != Some(b'>') {
                return Err(AdiError::UnterminatedTag { offset: tag_start });
            }
            let tag_text = String::from_utf8_lossy(&tag_text);

            let mut parts = tag_text.splitn(3, ':');
            let name = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
            let Some(length) = parts.next() else {
                match name.as_str() {
                    "eor" => return Ok(Some(Tag::EndOfRecord)),
                    "eoh" => return Ok(Some(Tag::EndOfHeader)),
                    _ => {
                        // Stray angle brackets in header text or comments
                        tracing::trace!(tag = %name, offset = tag_start, "ignoring tag without length");
                        continue;
                    }
                }
            };
            let length: usize =
                length
                    .trim()
                    .parse()
                    .map_err(|_| AdiError::InvalidLength {
                        tag: tag_text.to_string(),
                        offset: tag_start,
                    })?;

            // Buffer grows with the bytes read, not with the declared length
            let mut value = Vec::new();
            (&mut self.inner)
                .take(length as u64)
                .read_to_end(&mut value)?;
            if value.len() < length {
                return Err(AdiError::Truncated {
                    field: name,
                    offset: self.offset + value.len() as u64,
                });
            }
            let value_start = self.offset;
            self.offset += length as u64;
            let value = String::from_utf8(value).map_err(|_| AdiError::InvalidUtf8 {
                field: name.clone(),
                offset: value_start,
            })?;

            return Ok(Some(Tag::Field { name, value }));
        }
    }
}

impl<R: BufRead> RecordSource for AdiReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>, AdiError> {
        let mut record = Record::new();
        loop {
            match self.next_tag()? {
                Some(Tag::Field { name, value }) => record.set(&name, value),
                Some(Tag::EndOfHeader) => {
                    // Fields seen so far were header fields
                    if self.in_header {
                        tracing::trace!(fields = record.len(), "skipped ADI header");
                    }
                    self.in_header = false;
                    record = Record::new();
                }
                Some(Tag::EndOfRecord) => {
                    self.in_header = false;
                    self.count += 1;
                    return Ok(Some(record));
                }
                None if record.is_empty() => return Ok(None),
                None => {
                    tracing::warn!(fields = record.len(), "final record has no <eor>");
                    self.in_header = false;
                    self.count += 1;
                    return Ok(Some(record));
                }
            }
        }
    }

    fn record_count(&self) -> usize {
        self.count
    }
}

/// ADI writer emitting one record per line
pub struct AdiWriter<W: Write> {
    inner: W,
    comment: String,
    header_written: bool,
}

impl<W: Write> AdiWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            comment: PROGRAM_ID.to_string(),
            header_written: false,
        }
    }

    /// Free-text first line of the header, usually the tool name
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    fn write_header(&mut self) -> Result<(), AdiError> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.inner, "{}", self.comment.trim_end())?;
        writeln!(
            self.inner,
            "<adif_ver:{}>{} <programid:{}>{} <eoh>",
            ADIF_VERSION.len(),
            ADIF_VERSION,
            PROGRAM_ID.len(),
            PROGRAM_ID
        )?;
        self.header_written = true;
        Ok(())
    }

    /// Consume the writer, returning the underlying stream
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RecordSink for AdiWriter<W> {
    fn write_record(&mut self, record: &Record) -> Result<(), AdiError> {
        self.write_header()?;
        for (name, value) in record.fields() {
            write!(self.inner, "<{}:{}>{} ", name, value.len(), value)?;
        }
        writeln!(self.inner, "<eor>")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), AdiError> {
        self.write_header()?;
        self.inner.flush()?;
        Ok(())
    }
}
