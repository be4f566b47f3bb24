/// Error types for instrument care records
use thiserror::Error;

use crate::types::RecordId;

/// Result type alias using `CareError`
pub type Result<T> = std::result::Result<T, CareError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CareError {
    /// No record with this id belongs to the owner
    #[error("Care record not found: {id}")]
    NotFound { id: RecordId },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CareError {
    pub fn not_found(id: &RecordId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
