//! Common error types for SCDB

use thiserror::Error;

/// Common result type for SCDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the SCDB crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client-side precondition not met (missing or malformed input)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
