//! Error types for the ingestion crate.

use thiserror::Error;

/// Errors that can occur while fetching observations.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid source configuration: {0}")]
    InvalidConfig(String),

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },

    #[error("Invalid retry policy: {0}")]
    InvalidRetryPolicy(String),
}

impl FetchError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, FetchError>;
