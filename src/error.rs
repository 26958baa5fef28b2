//! Error types for entity queries and response shaping.

use thiserror::Error;

/// Result alias used by the query engine and response shaper.
pub type GeoResult<T> = Result<T, GeoError>;

#[derive(Debug, Error)]
pub enum GeoError {
    /// Caller input rejected before any query runs.
    #[error("Invalid request: {0}")]
    Validation(String),
    /// Store unreachable or query rejected.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[from] diesel::result::Error),
    /// Stored geometry could not be parsed while building GeoJSON.
    #[error("Malformed geometry for entity {id}: {reason}")]
    MalformedGeometry { id: i64, reason: String },
}

impl GeoError {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GeoError::Validation(_))
    }
}
