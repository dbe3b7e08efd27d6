//! Error types for CEV

use thiserror::Error;

/// Result type alias for CEV operations
pub type Result<T> = std::result::Result<T, CevError>;

/// Main error type for the shared crate
#[derive(Error, Debug)]
pub enum CevError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid timestamp '{0}': expected an ISO 8601 date-time")]
    InvalidTimestamp(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
