//! Reasoning backend error types.

use thiserror::Error;

/// Errors that can occur when talking to a reasoning backend.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key not configured.
    #[error("API key not configured for {provider}")]
    ApiKeyNotConfigured {
        /// Provider name.
        provider: String,
    },

    /// API request failed before a response arrived.
    #[error("API request failed: {0}")]
    ApiRequestFailed(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, retry after {retry_after_secs} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Non-success HTTP status from the backend.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Response body (may be truncated by the server).
        body: String,
    },

    /// Invalid response from API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LlmError {
    /// Whether retrying the same request could plausibly succeed.
    ///
    /// Transport failures, rate limiting, and 5xx/408 responses are transient.
    /// Missing credentials, other 4xx responses, malformed payloads, and
    /// configuration problems are not.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ApiRequestFailed(_) | Self::RateLimitExceeded { .. } | Self::HttpError(_) => true,
            Self::HttpStatus { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::ApiKeyNotConfigured { .. } | Self::InvalidResponse(_) | Self::ConfigError(_) => {
                false
            },
        }
    }
}

/// Result type for reasoning backend operations.
pub type LlmResult<T> = Result<T, LlmError>;
