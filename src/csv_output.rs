//! CSV output of selected record fields
//!
//! The header row holds the requested field names in lower case; each
//! record becomes one row with absent fields written as empty cells.

use crate::record::Record;
use std::io::{self, Write};

/// Streaming CSV writer for a fixed list of fields
#[derive(Debug)]
pub struct CsvOutput<W: Write> {
    inner: W,
    fields: Vec<String>,
    header_written: bool,
    rows: usize,
}

impl<W: Write> CsvOutput<W> {
    /// Create a CSV writer for the given field names
    pub fn new<S: AsRef<str>>(inner: W, fields: &[S]) -> Self {
        Self {
            inner,
            fields: fields
                .iter()
                .map(|f| f.as_ref().to_ascii_lowercase())
                .collect(),
            header_written: false,
            rows: 0,
        }
    }

    /// Header row
    fn header(&self) -> String {
        let cells: Vec<String> = self.fields.iter().map(|f| Self::escape_field(f)).collect();
        cells.join(",")
    }

    /// Escape CSV field (handle commas, quotes, line breaks, leading space)
    fn escape_field(field: &str) -> String {
        let needs_quotes = field.contains(&[',', '"', '\n', '\r'][..]) || field.starts_with(' ');
        if needs_quotes {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Format a record as a CSV row
    fn format_record(&self, record: &Record) -> String {
        let cells: Vec<String> = self
            .fields
            .iter()
            .map(|f| Self::escape_field(record.get(f).unwrap_or("")))
            .collect();
        cells.join(",")
    }

    fn write_header(&mut self) -> io::Result<()> {
        if !self.header_written {
            let header = self.header();
            writeln!(self.inner, "{}", header)?;
            self.header_written = true;
        }
        Ok(())
    }

    /// Append one record as a row
    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.write_header()?;
        let row = self.format_record(record);
        writeln!(self.inner, "{}", row)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Write the header if nothing was written yet, then flush
    pub fn flush(&mut self) -> io::Result<()> {
        self.write_header()?;
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Csv = CsvOutput<Vec<u8>>;

    #[test]
    fn test_csv_header_is_lower_case() {
        let output = Csv::new(Vec::new(), &["CALL", "Band"]);
        assert_eq!(output.header(), "call,band");
    }

    #[test]
    fn test_csv_escape_field_simple() {
        assert_eq!(Csv::escape_field("hello"), "hello");
    }

    #[test]
    fn test_csv_escape_field_with_comma() {
        assert_eq!(Csv::escape_field("hello,world"), "\"hello,world\"");
    }

    #[test]
    fn test_csv_escape_field_with_quote() {
        assert_eq!(Csv::escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_escape_field_with_leading_space() {
        assert_eq!(Csv::escape_field(" 599"), "\" 599\"");
    }

    #[test]
    fn test_csv_absent_fields_are_empty() {
        let mut output = Csv::new(Vec::new(), &["call", "qth", "band"]);
        output
            .write_record(&Record::from_pairs([("call", "W1AW"), ("band", "20m")]))
            .unwrap();
        output.flush().unwrap();
        assert_eq!(output.rows(), 1);
        let text = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(text, "call,qth,band\nW1AW,,20m\n");
    }

    #[test]
    fn test_csv_header_written_without_records() {
        let mut output = Csv::new(Vec::new(), &["call"]);
        output.flush().unwrap();
        assert_eq!(String::from_utf8(output.into_inner()).unwrap(), "call\n");
    }

    #[test]
    fn test_csv_quotes_values_in_rows() {
        let mut output = Csv::new(Vec::new(), &["comment"]);
        output
            .write_record(&Record::from_pairs([("comment", "nice, \"loud\" signal")]))
            .unwrap();
        let text = String::from_utf8(output.into_inner()).unwrap();
        assert_eq!(text, "comment\n\"nice, \"\"loud\"\" signal\"\n");
    }
}
