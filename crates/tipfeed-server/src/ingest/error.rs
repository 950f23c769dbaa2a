//! Feed ingestion errors
//!
//! A single taxonomy shared by fetchers, parsers and the coordinator. Whatever the variant,
//! the coordinator records `to_string()` as the run's `error_text`.

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;

/// Error types for feed ingestion
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Network failure, including timeouts
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// Payload is not the expected format (e.g. an HTML block page)
    #[error("Format error: {0}")]
    Format(String),

    /// Structural failure of the payload as a whole
    #[error("Parse error: {0}")]
    Parse(String),

    /// Persistence failure
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// No fetcher is registered for the requested family
    #[error("No fetcher registered for feed family '{0}'")]
    NotRegistered(String),

    /// Fetcher panicked mid-run
    #[error("Feed run panicked: {0}")]
    Panicked(String),
}

impl FeedError {
    /// Short machine-readable category, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Transport(_) => "transport",
            FeedError::HttpStatus { .. } => "http_status",
            FeedError::Format(_) => "format",
            FeedError::Parse(_) => "parse",
            FeedError::Storage(_) => "storage",
            FeedError::NotRegistered(_) => "not_registered",
            FeedError::Panicked(_) => "panicked",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FeedError::Transport(e) if e.is_timeout())
    }
}

impl From<csv::Error> for FeedError {
    fn from(err: csv::Error) -> Self {
        FeedError::Parse(err.to_string())
    }
}
