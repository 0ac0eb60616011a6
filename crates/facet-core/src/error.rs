//! Error types for Facet

use crate::id::RowRef;
use thiserror::Error;

/// The main error type for Facet operations
#[derive(Debug, Error)]
pub enum FacetError {
    #[error("Duplicate id: {0}")]
    DuplicateId(RowRef),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Array buffer exceeded: more than {limit} entries")]
    ArrayBufferExceeded { limit: usize },

    #[error("No database opened")]
    NoDatabase,

    #[error("Database is opened read-only")]
    ReadOnlyDb,

    #[error("Row not found: {0}")]
    NotFound(RowRef),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Schema migration to version {version} failed: {reason}")]
    Migration { version: i64, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for Facet operations
pub type Result<T> = std::result::Result<T, FacetError>;

impl FacetError {
    /// True if the error originates from the store rather than from a request
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            FacetError::Database(_)
                | FacetError::Migration { .. }
                | FacetError::ArrayBufferExceeded { .. }
                | FacetError::IoError(_)
        )
    }
}

impl From<rusqlite::Error> for FacetError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ReadOnly) => FacetError::ReadOnlyDb,
            _ => FacetError::Database(err.to_string()),
        }
    }
}

impl From<toml::de::Error> for FacetError {
    fn from(err: toml::de::Error) -> Self {
        FacetError::TomlParseError(err.to_string())
    }
}
