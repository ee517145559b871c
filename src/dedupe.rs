//! Duplicate suppression across one pass
//!
//! Two records are the same contact when their field sets are equal after
//! lower-casing names and ignoring field order. Values are compared
//! byte-for-byte. Identities are kept as SHA-256 digests of the canonical
//! field list so memory stays proportional to the number of distinct records.

use crate::adi::AdiError;
use crate::record::Record;
use crate::store::RecordSource;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Identity digest of a record
pub type RecordIdentity = [u8; 32];

/// Compute the identity of a record
pub fn record_identity(record: &Record) -> RecordIdentity {
    let mut hasher = Sha256::new();
    for (name, value) in record.canonical_fields() {
        // Length prefixes keep ("ab","c") distinct from ("a","bc")
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update((value.len() as u64).to_le_bytes());
        hasher.update(value.as_bytes());
    }
    hasher.finalize().into()
}

/// Reader wrapper that drops records already seen in this pass
pub struct DedupeReader<S: RecordSource> {
    inner: S,
    seen: HashSet<RecordIdentity>,
    emitted: usize,
    duplicates: usize,
}

impl<S: RecordSource> DedupeReader<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            emitted: 0,
            duplicates: 0,
        }
    }

    /// Records dropped as duplicates so far
    pub fn duplicate_count(&self) -> usize {
        self.duplicates
    }
}

impl<S: RecordSource> RecordSource for DedupeReader<S> {
    fn read_record(&mut self) -> Result<Option<Record>, AdiError> {
        while let Some(record) = self.inner.read_record()? {
            let identity = record_identity(&record);
            if self.seen.insert(identity) {
                self.emitted += 1;
                return Ok(Some(record));
            }
            self.duplicates += 1;
            tracing::debug!(identity = %hex::encode(&identity[..8]), "dropping duplicate record");
        }
        Ok(None)
    }

    /// Records actually emitted, duplicates excluded
    fn record_count(&self) -> usize {
        self.emitted
    }
}
