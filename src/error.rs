//! Error types for har-replay

use std::io;
use thiserror::Error;

/// Result type for replay operations
pub type Result<T> = std::result::Result<T, ReplayError>;

/// Errors that can occur while loading or replaying recordings
#[derive(Debug, Error)]
pub enum ReplayError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// HAR document could not be deserialized
    #[error("Invalid HAR document: {0}")]
    InvalidHar(#[from] serde_json::Error),

    /// HAR file not found
    #[error("HAR file not found: {0}")]
    FileNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP response could not be constructed
    #[error("Failed to build response: {0}")]
    Http(#[from] hyper::http::Error),

    /// The matched entry carries a recorded network failure; the caller
    /// must drop the connection without writing a response.
    #[error("Simulated network failure: {0}")]
    SimulatedFailure(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}
