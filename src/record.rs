//! ADIF contact record with case-insensitive field access
//!
//! A record is a set of named fields. Names are stored lower-case so that
//! `CALL`, `Call` and `call` address the same field. Insertion order is
//! retained only so that written output looks like the input.

use thiserror::Error;

/// Errors raised when a required field cannot be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("field not present: {0}")]
    MissingField(String),
}

/// One logged contact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(name, value)` pairs; later duplicates replace earlier ones
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Self::new();
        for (name, value) in pairs {
            record.set(name.as_ref(), value);
        }
        record
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Value of a field, `None` when the field is absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].1.as_str())
    }

    /// Value of a field that the caller cannot do without
    pub fn require(&self, name: &str) -> Result<&str, RecordError> {
        self.get(name)
            .ok_or_else(|| RecordError::MissingField(name.to_ascii_lowercase()))
    }

    /// Whether the field exists, regardless of its value
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set a field, replacing any existing value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(i) => self.fields[i].1 = value,
            None => self.fields.push((name.to_ascii_lowercase(), value)),
        }
    }

    /// Remove a field; removing an absent field does nothing
    pub fn delete(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|i| self.fields.remove(i).1)
    }

    /// Fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields sorted by name, the order-insensitive view used for identity
    pub fn canonical_fields(&self) -> Vec<(&str, &str)> {
        let mut fields: Vec<(&str, &str)> = self.fields().collect();
        fields.sort_unstable();
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_case_insensitive() {
        let record = Record::from_pairs([("CALL", "JA1ABC")]);
        assert_eq!(record.get("call"), Some("JA1ABC"));
        assert_eq!(record.get("Call"), Some("JA1ABC"));
        assert_eq!(record.fields().next(), Some(("call", "JA1ABC")));
    }

    #[test]
    fn test_absent_differs_from_empty() {
        let record = Record::from_pairs([("country", "")]);
        assert_eq!(record.get("country"), Some(""));
        assert_eq!(record.get("cqz"), None);
        assert!(record.contains("country"));
        assert!(!record.contains("cqz"));
    }

    #[test]
    fn test_set_replaces_without_duplicating() {
        let mut record = Record::from_pairs([("band", "20m")]);
        record.set("BAND", "40m");
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("band"), Some("40m"));
    }

    #[test]
    fn test_from_pairs_collapses_duplicate_keys() {
        let record = Record::from_pairs([("mode", "CW"), ("MODE", "SSB")]);
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("mode"), Some("SSB"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut record = Record::from_pairs([("call", "W1AW"), ("band", "20m")]);
        assert_eq!(record.delete("CALL"), Some("W1AW".to_string()));
        assert_eq!(record.delete("call"), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_require_reports_missing_field() {
        let record = Record::new();
        assert_eq!(
            record.require("QSO_DATE"),
            Err(RecordError::MissingField("qso_date".to_string()))
        );
    }

    #[test]
    fn test_canonical_fields_ignore_insertion_order() {
        let a = Record::from_pairs([("call", "W1AW"), ("band", "20m")]);
        let b = Record::from_pairs([("band", "20m"), ("call", "W1AW")]);
        assert_ne!(a, b);
        assert_eq!(a.canonical_fields(), b.canonical_fields());
    }
}
