//! Common error types for taxo

use thiserror::Error;

/// Common result type for taxo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the normalization engine and its stores
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input or entity invariant violation (rejected before any write)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Disallowed lifecycle transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Persistence failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON column encode/decode failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a validation failure
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True for errors caused by a record that does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
