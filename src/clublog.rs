//! Time-keyed prefix table
//!
//! Entity assignments change over time: prefixes move between entities and
//! individual operations get their own entity for a few days. This table
//! carries validity bounds on every entry and answers lookups for the
//! contact's timestamp. It has no ITU zone data.
//!
//! # Example TOML
//! ```toml
//! [[entity]]
//! adif = 291
//! name = "UNITED STATES OF AMERICA"
//! cqz = 5
//! cont = "NA"
//!
//! [[prefix]]
//! call = "K"
//! adif = 291
//!
//! [[exception]]
//! call = "K1ABC/KH6"
//! adif = 110
//! cqz = 31
//! cont = "OC"
//! start = "2019-03-01T00:00:00Z"
//! end = "2019-03-10T23:59:59Z"
//! ```

use crate::cty::prefix_part;
use crate::enrich::{DxccInfo, LookupError, TimedCallsignLookup};
use crate::timestamp::parse_bound;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClublogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid {field} bound {value:?} for {call}")]
    InvalidBound {
        call: String,
        field: &'static str,
        value: String,
    },

    #[error("{call} refers to unknown entity {adif}")]
    UnknownEntity { call: String, adif: u32 },
}

#[derive(Debug, Deserialize)]
struct TableFile {
    #[serde(default)]
    entity: Vec<EntityEntry>,
    #[serde(default)]
    prefix: Vec<CallEntry>,
    #[serde(default)]
    exception: Vec<CallEntry>,
}

#[derive(Debug, Deserialize)]
struct EntityEntry {
    adif: u32,
    name: String,
    cqz: u32,
    cont: String,
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CallEntry {
    call: String,
    adif: u32,
    name: Option<String>,
    cqz: Option<u32>,
    cont: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

/// Inclusive validity period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Validity {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl Validity {
    fn parse(call: &str, start: Option<&str>, end: Option<&str>) -> Result<Self, ClublogError> {
        let bound = |field: &'static str, value: Option<&str>| {
            value
                .map(|v| {
                    parse_bound(v).map_err(|_| ClublogError::InvalidBound {
                        call: call.to_string(),
                        field,
                        value: v.to_string(),
                    })
                })
                .transpose()
        };
        Ok(Self {
            start: bound("start", start)?,
            end: bound("end", end)?,
        })
    }

    fn covers(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

#[derive(Debug, Clone)]
struct Entity {
    name: String,
    cqz: u32,
    cont: String,
    validity: Validity,
}

#[derive(Debug, Clone)]
struct Assignment {
    adif: u32,
    name: Option<String>,
    cqz: Option<u32>,
    cont: Option<String>,
    validity: Validity,
}

/// Dated prefix and exception table
#[derive(Debug, Default)]
pub struct ClublogTable {
    entities: HashMap<u32, Entity>,
    prefixes: HashMap<String, Vec<Assignment>>,
    exceptions: HashMap<String, Vec<Assignment>>,
}

impl ClublogTable {
    /// Load a table from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ClublogError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parse a table from TOML text
    pub fn parse(text: &str) -> Result<Self, ClublogError> {
        let file: TableFile = toml::from_str(text)?;
        let mut table = Self::default();

        for e in file.entity {
            let validity = Validity::parse(&e.name, e.start.as_deref(), e.end.as_deref())?;
            table.entities.insert(
                e.adif,
                Entity {
                    name: e.name,
                    cqz: e.cqz,
                    cont: e.cont,
                    validity,
                },
            );
        }

        for (entries, exact) in [(file.prefix, false), (file.exception, true)] {
            for c in entries {
                if !table.entities.contains_key(&c.adif) {
                    return Err(ClublogError::UnknownEntity {
                        call: c.call,
                        adif: c.adif,
                    });
                }
                let validity = Validity::parse(&c.call, c.start.as_deref(), c.end.as_deref())?;
                let target = if exact {
                    &mut table.exceptions
                } else {
                    &mut table.prefixes
                };
                target
                    .entry(c.call.to_uppercase())
                    .or_default()
                    .push(Assignment {
                        adif: c.adif,
                        name: c.name,
                        cqz: c.cqz,
                        cont: c.cont,
                        validity,
                    });
            }
        }

        tracing::debug!(
            entities = table.entities.len(),
            prefixes = table.prefixes.len(),
            exceptions = table.exceptions.len(),
            "loaded dated prefix table"
        );
        Ok(table)
    }

    fn valid_assignment<'a>(
        entries: Option<&'a Vec<Assignment>>,
        at: DateTime<Utc>,
    ) -> Option<&'a Assignment> {
        entries?.iter().find(|a| a.validity.covers(at))
    }

    fn resolve(&self, call: &str, a: &Assignment, at: DateTime<Utc>) -> Result<DxccInfo, LookupError> {
        let entity = self.entities.get(&a.adif).ok_or_else(|| LookupError::Failed {
            call: call.to_string(),
            reason: format!("unknown entity {}", a.adif),
        })?;
        if !entity.validity.covers(at) {
            return Err(LookupError::Failed {
                call: call.to_string(),
                reason: format!("entity {} not valid at {}", a.adif, at.to_rfc3339()),
            });
        }
        Ok(DxccInfo {
            country: a.name.clone().unwrap_or_else(|| entity.name.clone()),
            cq_zone: Some(a.cqz.unwrap_or(entity.cqz)),
            itu_zone: None,
            continent: a.cont.clone().unwrap_or_else(|| entity.cont.clone()),
            entity: a.adif,
        })
    }
}

impl TimedCallsignLookup for ClublogTable {
    fn lookup_at(&self, call: &str, at: DateTime<Utc>) -> Result<DxccInfo, LookupError> {
        let call = call.trim().to_uppercase();
        if let Some(a) = Self::valid_assignment(self.exceptions.get(&call), at) {
            return self.resolve(&call, a, at);
        }

        let prefix = prefix_part(&call);
        (1..=prefix.len())
            .rev()
            .filter(|&len| prefix.is_char_boundary(len))
            .find_map(|len| Self::valid_assignment(self.prefixes.get(&prefix[..len]), at))
            .ok_or_else(|| LookupError::NotFound(call.clone()))
            .and_then(|a| self.resolve(&call, a, at))
    }
}
