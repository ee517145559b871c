//! Per-record error policy
//!
//! Tools that need a field to process a record (a timestamp, a callsign,
//! the Cabrillo exchange) decide here what a missing or malformed value
//! does to the pass.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do when a record cannot be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Report the record and continue with the next one
    #[value(name = "skip")]
    #[serde(alias = "skip_record")]
    Skip,
    /// Stop the pass with an error
    #[value(name = "abort")]
    #[serde(alias = "abort_pass")]
    Abort,
}

impl ErrorPolicy {
    /// Apply the policy to a per-record failure
    ///
    /// Returns `Ok(None)` when the record should be dropped and the pass
    /// continued, `Err` when the pass must stop.
    pub fn handle<T, E>(self, result: Result<T, E>, context: &str) -> Result<Option<T>, E>
    where
        E: fmt::Display,
    {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => match self {
                ErrorPolicy::Skip => {
                    tracing::warn!("{}: {}; record skipped", context, e);
                    Ok(None)
                }
                ErrorPolicy::Abort => Err(e),
            },
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Skip => write!(f, "skip"),
            ErrorPolicy::Abort => write!(f, "abort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_swallows_error() {
        let result: Result<u32, String> = Err("bad".to_string());
        assert_eq!(ErrorPolicy::Skip.handle(result, "record 1"), Ok(None));
    }

    #[test]
    fn test_abort_propagates_error() {
        let result: Result<u32, String> = Err("bad".to_string());
        assert_eq!(
            ErrorPolicy::Abort.handle(result, "record 1"),
            Err("bad".to_string())
        );
    }

    #[test]
    fn test_success_passes_through_either_policy() {
        assert_eq!(ErrorPolicy::Skip.handle(Ok::<_, String>(7), "r"), Ok(Some(7)));
        assert_eq!(ErrorPolicy::Abort.handle(Ok::<_, String>(7), "r"), Ok(Some(7)));
    }

    #[test]
    fn test_deserializes_from_config_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ErrorPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"abort\"").unwrap();
        assert_eq!(w.policy, ErrorPolicy::Abort);
        let w: Wrapper = toml::from_str("policy = \"skip_record\"").unwrap();
        assert_eq!(w.policy, ErrorPolicy::Skip);
    }
}
