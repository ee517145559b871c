//! Optional TOML configuration file
//!
//! Command-line flags win over the file, the file wins over built-in
//! defaults. Relative lookup paths are taken relative to the file.
//!
//! # Example TOML
//! ```toml
//! [policy]
//! cab = "skip"
//! time = "abort"
//!
//! [lookup]
//! cty = "cty.csv"
//! clublog = "clublog.toml"
//! ```

use crate::policy::ErrorPolicy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Tools whose per-record failures follow an [`ErrorPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyTool {
    Cab,
    Time,
    Dxcc,
    Dxcccl,
}

impl PolicyTool {
    /// Built-in default when neither the flag nor the file sets one
    pub fn default_policy(self) -> ErrorPolicy {
        match self {
            PolicyTool::Cab | PolicyTool::Dxcc => ErrorPolicy::Skip,
            PolicyTool::Time | PolicyTool::Dxcccl => ErrorPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub cab: Option<ErrorPolicy>,
    pub time: Option<ErrorPolicy>,
    pub dxcc: Option<ErrorPolicy>,
    pub dxcccl: Option<ErrorPolicy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupConfig {
    pub cty: Option<PathBuf>,
    pub clublog: Option<PathBuf>,
}

/// Contents of `--config FILE`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
}

impl ToolConfig {
    /// Load a configuration file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid TOML for
    /// this layout (unknown keys included).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: ToolConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Some(base) = path.parent() {
            for p in [&mut config.lookup.cty, &mut config.lookup.clublog]
                .into_iter()
                .flatten()
            {
                if p.is_relative() {
                    *p = base.join(&*p);
                }
            }
        }
        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_path)
    }

    /// Resolve the policy for a tool
    pub fn policy_for(&self, tool: PolicyTool, flag: Option<ErrorPolicy>) -> ErrorPolicy {
        let from_file = match tool {
            PolicyTool::Cab => self.policy.cab,
            PolicyTool::Time => self.policy.time,
            PolicyTool::Dxcc => self.policy.dxcc,
            PolicyTool::Dxcccl => self.policy.dxcccl,
        };
        flag.or(from_file).unwrap_or_else(|| tool.default_policy())
    }

    /// Path of the `cty.csv` database, flag first
    pub fn cty_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.lookup.cty.clone())
            .context("No cty database given (use --cty or [lookup] cty in the config file)")
    }

    /// Path of the dated prefix table, flag first
    pub fn clublog_path(&self, flag: Option<&Path>) -> Result<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.lookup.clublog.clone())
            .context("No prefix table given (use --clublog or [lookup] clublog in the config file)")
    }
}
