//! Fill-if-absent enrichment from callsign lookups
//!
//! A lookup yields the geographic fields of a DXCC entity. Each derived
//! value is written only when the record has no such field at all; a field
//! that exists keeps its value even when that value is empty.

use crate::record::Record;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("callsign not found: {0}")]
    NotFound(String),

    #[error("lookup failed for {call}: {reason}")]
    Failed { call: String, reason: String },
}

/// Entity data for a callsign
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DxccInfo {
    pub country: String,
    pub cq_zone: Option<u32>,
    pub itu_zone: Option<u32>,
    pub continent: String,
    pub entity: u32,
}

impl DxccInfo {
    /// ADIF fields this lookup result can supply, in write order
    pub fn derived_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("country", self.country.clone())];
        if let Some(cqz) = self.cq_zone {
            fields.push(("cqz", cqz.to_string()));
        }
        if let Some(ituz) = self.itu_zone {
            fields.push(("ituz", ituz.to_string()));
        }
        fields.push(("cont", self.continent.clone()));
        fields.push(("dxcc", self.entity.to_string()));
        fields
    }
}

/// Lookup keyed on callsign alone
pub trait CallsignLookup {
    fn lookup(&self, call: &str) -> Option<DxccInfo>;
}

/// Lookup keyed on callsign and contact time
pub trait TimedCallsignLookup {
    fn lookup_at(&self, call: &str, at: DateTime<Utc>) -> Result<DxccInfo, LookupError>;
}

/// Write each `(name, value)` pair whose field is absent; returns the names written
pub fn fill_absent<'a, I>(record: &mut Record, derived: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let mut written = Vec::new();
    for (name, value) in derived {
        if !record.contains(name) {
            record.set(name, value);
            written.push(name);
        }
    }
    written
}

/// Enrich a record from a callsign lookup
///
/// Returns the names of the fields written. A callsign the lookup does not
/// know leaves the record untouched.
pub fn enrich_record<L: CallsignLookup>(
    record: &mut Record,
    call: &str,
    lookup: &L,
) -> Vec<&'static str> {
    match lookup.lookup(&call.to_uppercase()) {
        Some(info) => fill_absent(record, info.derived_fields()),
        None => {
            tracing::debug!(call, "no lookup data; record passed through");
            Vec::new()
        }
    }
}

/// Enrich a record from a time-keyed lookup
///
/// Lookup errors, not-found included, leave the record untouched.
pub fn enrich_record_at<L: TimedCallsignLookup>(
    record: &mut Record,
    call: &str,
    at: DateTime<Utc>,
    lookup: &L,
) -> Vec<&'static str> {
    match lookup.lookup_at(&call.to_uppercase(), at) {
        Ok(info) => fill_absent(record, info.derived_fields()),
        Err(e) => {
            tracing::debug!("{}; record passed through", e);
            Vec::new()
        }
    }
}
