//! Configuration
//!
//! Settings are read from a TOML file. Every field has a default, so an empty
//! file (or no file) is a valid configuration.
//!
//! ```toml
//! [log]
//! level = "debug"
//! format = "json"
//!
//! [engine]
//! validate_input = true
//!
//! [source]
//! max_records = 90
//! user_id = "user-123"
//! ```

use crate::error::InsightError;
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default number of records fetched per user
pub const DEFAULT_MAX_RECORDS: usize = 180;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub log: LogConfig,
    pub engine: EngineConfig,
    pub source: SourceConfig,
}

/// Engine input handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reject malformed or mis-ordered records instead of generating from them
    pub validate_input: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_input: true,
        }
    }
}

/// Data source settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Maximum number of recent records to load
    pub max_records: usize,
    /// Default user to load records for
    pub user_id: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
            user_id: None,
        }
    }
}

impl PulseConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, InsightError> {
        let config: PulseConfig = toml::from_str(toml_str)?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, InsightError> {
        let contents = fs::read_to_string(path).map_err(|e| {
            InsightError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, InsightError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, InsightError> {
        toml::to_string_pretty(self).map_err(|e| InsightError::ConfigError(e.to_string()))
    }

    fn check(&self) -> Result<(), InsightError> {
        if self.source.max_records == 0 {
            return Err(InsightError::ConfigError(
                "source.max_records must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
