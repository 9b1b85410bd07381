//! Error types for Pulse Insights

use crate::validate::ValidationError;
use thiserror::Error;

/// Errors that can occur while loading records or producing insight output
#[derive(Debug, Error)]
pub enum InsightError {
    #[error("Failed to parse metric records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid metric record: {0}")]
    InvalidRecord(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Logging setup failed: {0}")]
    LoggingError(String),
}

impl From<toml::de::Error> for InsightError {
    fn from(e: toml::de::Error) -> Self {
        InsightError::ConfigError(e.to_string())
    }
}
