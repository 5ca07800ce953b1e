//! Error types for chat relay operations

use crate::extractor::ExtractError;
use crate::store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors from an upstream chat-completion API
#[derive(Debug, Error)]
pub enum ChatError {
    /// API key is missing or rejected
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    #[error("Rate limit exceeded: {message}. Retry after {retry_after:?}")]
    RateLimitExceeded { message: String, retry_after: Option<Duration> },

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// Non-success HTTP status from the API
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Parsing error: {message}")]
    ParseError { message: String },

    /// The API answered without any text
    #[error("Empty response from {provider}")]
    EmptyResponse { provider: String },
}

impl ChatError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::AuthenticationError { message: message.into() }
    }

    pub fn rate_limit(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimitExceeded { message: message.into(), retry_after }
    }

    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout { duration }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError { message: message.into() }
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError { status, message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError { message: message.into() }
    }

    pub fn empty(provider: impl Into<String>) -> Self {
        Self::EmptyResponse { provider: provider.into() }
    }

    /// Map an HTTP status and body to the matching error
    pub fn from_status(status: u16, body: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::auth(body),
            429 => Self::rate_limit(body, retry_after),
            _ => Self::api(status, body),
        }
    }

    /// Rate limits, timeouts, network failures and 5xx answers are worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimitExceeded { .. } | Self::Timeout { .. } | Self::NetworkError { .. } => {
                true
            }
            Self::ApiError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server supplied delay before the next attempt
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimitExceeded { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { duration: Duration::ZERO }
        } else if err.is_decode() {
            Self::ParseError { message: err.to_string() }
        } else {
            Self::NetworkError { message: err.to_string() }
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError { message: err.to_string() }
    }
}

/// Errors from a relay turn
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Invalid relay request: {0}")]
    InvalidRequest(String),
}
