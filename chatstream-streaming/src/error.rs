//! Streaming errors.

use thiserror::Error;

/// Errors that end a stream.
///
/// Anything recoverable inside a single block (bad JSON, malformed UTF-8)
/// is absorbed by the decoder and never shows up here.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The transport failed while reading.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, read best-effort.
        body: String,
    },

    /// The response carried no body to decode.
    #[error("No response body")]
    MissingBody,

    /// The request was rejected before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Undelimited input grew past the configured limit.
    #[error("Decode buffer exceeded {limit} bytes")]
    BufferOverflow {
        /// The configured limit.
        limit: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was cancelled by the caller.
    #[error("Stream cancelled")]
    Cancelled,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl StreamError {
    /// Whether re-issuing the whole stream might succeed.
    ///
    /// The decoder never retries by itself; this is a hint for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Io(_) => true,
            Self::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }

    /// Create a transport error from anything displayable.
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    /// Create from any error.
    pub fn from_err<E: std::fmt::Display>(err: E) -> Self {
        Self::Other(err.to_string())
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
