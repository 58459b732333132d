//! Transport error types.

use chatstream_core::RequestError;
use chatstream_streaming::StreamError;
use thiserror::Error;

/// Errors raised while opening a stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Non-success HTTP status.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, read best-effort.
        body: String,
    },

    /// The request could not be sent or the connection failed.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request body is incomplete.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response has no body to stream.
    #[error("No response body")]
    MissingBody,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Check if re-opening the stream might succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            Self::Request(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

impl From<RequestError> for TransportError {
    fn from(err: RequestError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl From<TransportError> for StreamError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Http { status, body } => StreamError::Http { status, body },
            TransportError::Request(err) => StreamError::transport(err),
            TransportError::MissingBody => StreamError::MissingBody,
            TransportError::InvalidRequest(msg) => StreamError::InvalidRequest(msg),
            other @ (TransportError::InvalidUrl(_)
            | TransportError::Configuration(_)
            | TransportError::Serialization(_)) => StreamError::InvalidRequest(other.to_string()),
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
