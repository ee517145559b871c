//! Record selection by regular expression on one field
//!
//! The field name is case-insensitive. An absent field is matched as the
//! empty string, so `^$` selects records without the field as well as
//! records where it is empty.

use crate::record::Record;
use anyhow::{Context, Result};
use regex::Regex;

/// Field/regex filter used by `grep`
#[derive(Debug, Clone)]
pub struct FieldFilter {
    field: String,
    pattern: Regex,
    invert: bool,
}

impl FieldFilter {
    /// Build a filter; an invalid pattern is a configuration error
    pub fn new(field: &str, pattern: &str, invert: bool) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("Invalid regex pattern: {}", pattern))?;
        Ok(Self {
            field: field.to_ascii_lowercase(),
            pattern,
            invert,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the record should be written
    pub fn selects(&self, record: &Record) -> bool {
        let value = record.get(&self.field).unwrap_or("");
        self.pattern.is_match(value) != self.invert
    }
}
