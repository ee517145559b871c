//! Prefix database in the AD1C `cty.csv` layout
//!
//! Each line describes one entity:
//!
//! ```text
//! K,United States,291,NA,5,8,37.53,91.67,5.0,AA AB K =W1AW(5)[8] ...;
//! ```
//!
//! The last column lists prefixes separated by spaces and terminated by `;`.
//! A leading `=` marks a full callsign. Suffixes `(cq)`, `[itu]` and
//! `{cont}` override the entity's zones and continent for that prefix;
//! `<lat/long>` and `~tz~` are accepted and ignored.

use crate::enrich::{CallsignLookup, DxccInfo};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Suffixes after `/` that do not change the entity
const PORTABLE_SUFFIXES: &[&str] = &["P", "M", "MM", "AM", "QRP", "A", "B", "LH"];

/// Callsign lookup table loaded from `cty.csv`
#[derive(Debug, Default)]
pub struct CtyDatabase {
    prefixes: HashMap<String, DxccInfo>,
    exact: HashMap<String, DxccInfo>,
    entities: usize,
}

impl CtyDatabase {
    /// Load a `cty.csv` file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CtyError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&text)
    }

    /// Parse `cty.csv` text
    pub fn parse(text: &str) -> Result<Self, CtyError> {
        let mut db = Self::default();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            db.parse_line(i + 1, line)?;
        }
        tracing::debug!(
            entities = db.entities,
            prefixes = db.prefixes.len(),
            exact = db.exact.len(),
            "loaded cty database"
        );
        Ok(db)
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<(), CtyError> {
        let parse_err = |reason: String| CtyError::Parse {
            line: line_no,
            reason,
        };

        let cols: Vec<&str> = line.splitn(10, ',').collect();
        if cols.len() != 10 {
            return Err(parse_err(format!("expected 10 columns, found {}", cols.len())));
        }
        let number = |idx: usize, what: &str| -> Result<u32, CtyError> {
            cols[idx]
                .trim()
                .parse()
                .map_err(|_| parse_err(format!("invalid {}: {:?}", what, cols[idx])))
        };

        let base = DxccInfo {
            country: cols[1].trim().to_string(),
            entity: number(2, "entity number")?,
            continent: cols[3].trim().to_string(),
            cq_zone: Some(number(4, "CQ zone")?),
            itu_zone: Some(number(5, "ITU zone")?),
        };
        self.entities += 1;

        let prefixes = cols[9].trim().trim_end_matches(';');
        for token in prefixes.split_whitespace() {
            let (exact, token) = match token.strip_prefix('=') {
                Some(rest) => (true, rest),
                None => (false, token),
            };
            let (key, info) = apply_overrides(token, &base)
                .map_err(|reason| parse_err(format!("prefix {:?}: {}", token, reason)))?;
            if key.is_empty() {
                continue;
            }
            let table = if exact {
                &mut self.exact
            } else {
                &mut self.prefixes
            };
            table.insert(key, info);
        }
        Ok(())
    }

    /// Number of entities loaded
    pub fn entity_count(&self) -> usize {
        self.entities
    }

    fn longest_prefix(&self, call: &str) -> Option<&DxccInfo> {
        (1..=call.len())
            .rev()
            .filter(|&len| call.is_char_boundary(len))
            .find_map(|len| self.prefixes.get(&call[..len]))
    }
}

/// Split a prefix token into its key and the entity data it resolves to
fn apply_overrides(token: &str, base: &DxccInfo) -> Result<(String, DxccInfo), String> {
    let mut info = base.clone();
    let key_end = token
        .find(&['(', '[', '{', '<', '~'][..])
        .unwrap_or(token.len());
    let key = token[..key_end].to_uppercase();

    let mut rest = &token[key_end..];
    while let Some(open) = rest.chars().next() {
        let close = match open {
            '(' => ')',
            '[' => ']',
            '{' => '}',
            '<' => '>',
            '~' => '~',
            other => return Err(format!("unexpected character {:?}", other)),
        };
        let body_end = rest[1..]
            .find(close)
            .ok_or_else(|| format!("unterminated {:?}", open))?
            + 1;
        let body = &rest[1..body_end];
        match open {
            '(' => info.cq_zone = Some(body.parse().map_err(|_| format!("bad CQ zone {:?}", body))?),
            '[' => info.itu_zone = Some(body.parse().map_err(|_| format!("bad ITU zone {:?}", body))?),
            '{' => info.continent = body.to_string(),
            _ => {}
        }
        rest = &rest[body_end + 1..];
    }
    Ok((key, info))
}

/// Part of a compound callsign that carries the entity
///
/// `DL/K1ABC` and `K1ABC/DL` resolve through `DL`; operating suffixes such as
/// `/P` or a single call-area digit keep the home call.
pub fn prefix_part(call: &str) -> &str {
    let parts: Vec<&str> = call
        .split('/')
        .filter(|p| !p.is_empty())
        .filter(|p| !PORTABLE_SUFFIXES.contains(p))
        .filter(|p| !(p.len() == 1 && p.chars().all(|c| c.is_ascii_digit())))
        .collect();
    match parts.as_slice() {
        [] => call,
        [only] => *only,
        [first, second, ..] => {
            if second.len() < first.len() {
                *second
            } else {
                *first
            }
        }
    }
}

impl CallsignLookup for CtyDatabase {
    fn lookup(&self, call: &str) -> Option<DxccInfo> {
        let call = call.trim().to_uppercase();
        if let Some(info) = self.exact.get(&call) {
            return Some(info.clone());
        }
        self.longest_prefix(prefix_part(&call)).cloned()
    }
}
