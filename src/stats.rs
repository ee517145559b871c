//! Contact log statistics for the `stat` tool
//!
//! One [`StatsAggregator`] is fed every record of a pass. Each dimension is
//! tallied independently: a missing or malformed field only skips its own
//! dimension for that record. Rendering borrows the aggregator immutably, so
//! the tables cannot change once output has started.

use crate::canonical::{stats_band, BAND_PLAN};
use crate::record::Record;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::str::FromStr;
use thiserror::Error;

/// Country tally key for records without a country
pub const UNKNOWN_COUNTRY: &str = "(UNKNOWN)";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    #[error("invalid query type: {0} (valid: bands, country, dxcc, gridsquare, modes, nqso, submodes)")]
    InvalidQuery(String),
}

/// Statistics dimension to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatQuery {
    Bands,
    Country,
    Dxcc,
    Gridsquare,
    Modes,
    Nqso,
    Submodes,
}

impl FromStr for StatQuery {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bands" => Ok(StatQuery::Bands),
            "country" => Ok(StatQuery::Country),
            "dxcc" => Ok(StatQuery::Dxcc),
            "gridsquare" => Ok(StatQuery::Gridsquare),
            "modes" => Ok(StatQuery::Modes),
            "nqso" => Ok(StatQuery::Nqso),
            "submodes" => Ok(StatQuery::Submodes),
            other => Err(StatsError::InvalidQuery(other.to_string())),
        }
    }
}

/// Frequency tables and presence sets for one pass
#[derive(Debug, Default)]
pub struct StatsAggregator {
    records: u64,
    bands: BTreeMap<String, u64>,
    countries: BTreeMap<String, u64>,
    dxcc: BTreeSet<i64>,
    grids: BTreeSet<String>,
    modes: BTreeMap<String, u64>,
    submodes: BTreeMap<String, u64>,
}

fn bump(table: &mut BTreeMap<String, u64>, key: String) {
    *table.entry(key).or_default() += 1;
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tally one record
    pub fn record(&mut self, record: &Record) {
        self.records += 1;

        if let Some(band) = record.get("band") {
            bump(&mut self.bands, stats_band(band));
        }

        let country = match record.get("country") {
            Some(c) if !c.is_empty() => c.to_uppercase(),
            _ => UNKNOWN_COUNTRY.to_string(),
        };
        bump(&mut self.countries, country);

        match record.get("dxcc") {
            None | Some("") => {}
            Some(raw) => match raw.parse::<i64>() {
                Ok(entity) => {
                    self.dxcc.insert(entity);
                }
                Err(e) => tracing::warn!(value = raw, "dxcc is not an integer: {}", e),
            },
        }

        if let Some(grid) = record.get("gridsquare") {
            if grid.chars().count() >= 4 {
                let square: String = grid.chars().take(4).collect();
                self.grids.insert(square.to_uppercase());
            }
        }

        if let Some(mode) = record.get("mode") {
            bump(&mut self.modes, mode.to_uppercase());
        }

        match record.get("submode") {
            None | Some("") => {}
            Some(submode) => bump(&mut self.submodes, submode.to_uppercase()),
        }
    }

    /// Number of records tallied
    pub fn record_count(&self) -> u64 {
        self.records
    }

    pub fn band_counts(&self) -> &BTreeMap<String, u64> {
        &self.bands
    }

    pub fn country_counts(&self) -> &BTreeMap<String, u64> {
        &self.countries
    }

    pub fn dxcc_entities(&self) -> &BTreeSet<i64> {
        &self.dxcc
    }

    pub fn grid_squares(&self) -> &BTreeSet<String> {
        &self.grids
    }

    pub fn mode_counts(&self) -> &BTreeMap<String, u64> {
        &self.modes
    }

    pub fn submode_counts(&self) -> &BTreeMap<String, u64> {
        &self.submodes
    }

    /// Band-plan bands with a non-zero tally, in plan order
    ///
    /// Tokens outside the band plan are tallied but not listed here.
    pub fn bands_in_plan_order(&self) -> Vec<(&'static str, u64)> {
        BAND_PLAN
            .iter()
            .filter_map(|band| self.bands.get(*band).map(|n| (*band, *n)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Render a query as text
    pub fn render_text(&self, query: StatQuery) -> String {
        let mut out = String::new();
        match query {
            StatQuery::Bands => {
                let pairs: Vec<String> = self
                    .bands_in_plan_order()
                    .into_iter()
                    .map(|(band, n)| format!("{} {}", band, n))
                    .collect();
                out.push_str(&pairs.join(" "));
                out.push('\n');
            }
            StatQuery::Country => {
                for (country, n) in &self.countries {
                    let _ = writeln!(out, "{}: {}", country, n);
                }
                let _ = writeln!(out, "(TOTAL): {}", self.records);
            }
            StatQuery::Dxcc => {
                let ids: Vec<String> = self.dxcc.iter().map(|d| d.to_string()).collect();
                out.push_str(&ids.join(" "));
                out.push('\n');
            }
            StatQuery::Gridsquare => {
                let grids: Vec<&str> = self.grids.iter().map(String::as_str).collect();
                out.push_str(&grids.join(" "));
                out.push('\n');
            }
            StatQuery::Modes => out.push_str(&render_pairs(&self.modes)),
            StatQuery::Submodes => out.push_str(&render_pairs(&self.submodes)),
            StatQuery::Nqso => {
                let _ = writeln!(out, "{}", self.records);
            }
        }
        out
    }

    /// Render a query as a JSON value
    pub fn render_json(&self, query: StatQuery) -> serde_json::Value {
        match query {
            StatQuery::Bands => {
                let bands: Vec<serde_json::Value> = self
                    .bands_in_plan_order()
                    .into_iter()
                    .map(|(band, count)| json!({ "band": band, "count": count }))
                    .collect();
                serde_json::Value::Array(bands)
            }
            StatQuery::Country => json!({
                "countries": self.countries,
                "total": self.records,
            }),
            StatQuery::Dxcc => json!(self.dxcc),
            StatQuery::Gridsquare => json!(self.grids),
            StatQuery::Modes => json!(self.modes),
            StatQuery::Submodes => json!(self.submodes),
            StatQuery::Nqso => json!({ "nqso": self.records }),
        }
    }
}

fn render_pairs(table: &BTreeMap<String, u64>) -> String {
    let pairs: Vec<String> = table.iter().map(|(k, n)| format!("{} {}", k, n)).collect();
    format!("{}\n", pairs.join(" "))
}
