//! Error types shared across tipfeed crates

use thiserror::Error;

/// Result type alias for shared tipfeed operations
pub type Result<T> = std::result::Result<T, TipError>;

/// Errors raised by shared helpers (configuration, timestamps, logging)
#[derive(Error, Debug)]
pub enum TipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Logging setup error: {0}")]
    Logging(String),
}

impl TipError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
