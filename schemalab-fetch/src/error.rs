//! Fetch error types.

use std::time::Duration;
use thiserror::Error;

/// Errors from resolving a fetch request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The URL is blank.
    #[error("Please enter a URL")]
    MissingUrl,

    /// The URL could not be parsed.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The request was aborted after its timeout elapsed.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The request was cancelled by the caller.
    #[error("Request cancelled")]
    Cancelled,

    /// Connection, TLS or body read failure.
    #[error("Network error: {0}")]
    Network(String),
}

impl FetchError {
    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Whether the request was aborted by its timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(Duration::ZERO)
        } else {
            FetchError::Network(err.to_string())
        }
    }
}
