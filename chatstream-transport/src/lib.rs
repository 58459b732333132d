//! # chatstream-transport
//!
//! HTTP transport for chatstream.
//!
//! Opens a streaming chat response and hands the body to the decoder as a
//! [`ByteSource`](chatstream_streaming::ByteSource). Reading, decoding and
//! lifecycle handling live in `chatstream-streaming`.
//!
//! ## Core Concepts
//!
//! - **[`TransportConfig`]**: base URL, endpoint path, bearer token, timeouts
//! - **[`Transport`]**: the seam between a request and an open body
//! - **[`HttpTransport`]**: `reqwest` implementation that `POST`s JSON
//! - **[`HttpByteSource`]**: the open response body
//!
//! Failures to open a stream are never retried here; callers that want
//! retries re-open the whole stream, using [`TransportError::is_retryable`]
//! to decide.
//!
//! ## Example
//!
//! ```ignore
//! use chatstream_core::ChatRequest;
//! use chatstream_transport::{HttpTransport, Transport, TransportConfig};
//!
//! let config = TransportConfig::parse("http://localhost:8080")?.auth_token(token);
//! let transport = HttpTransport::new(config)?;
//! let body = transport.open(&ChatRequest::user("Hello", "deepseek-chat")).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod transport;

// Re-exports
pub use config::{TransportConfig, ENV_BASE_URL, ENV_TIMEOUT_SECS, ENV_TOKEN};
pub use error::{TransportError, TransportResult};
pub use transport::{HttpByteSource, HttpTransport, Transport};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{HttpTransport, Transport, TransportConfig, TransportError, TransportResult};
}
