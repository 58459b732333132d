//! # chatstream - Streamed Chat Replies for Rust
//!
//! chatstream opens a streaming chat request and turns the response body,
//! a `data:`-line event stream delivered in arbitrary chunks, into an
//! ordered sequence of callbacks: message text, optional thinking text,
//! and exactly one of completion or error.
//!
//! ## Quick Start
//!
//! ```ignore
//! use chatstream::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     chatstream::telemetry::init_tracing("chatstream=info");
//!
//!     let transport = HttpTransport::new(TransportConfig::from_env()?)?;
//!     let mut reply = ReplyAccumulator::new();
//!
//!     let summary = stream_chat(
//!         &transport,
//!         &ChatRequest::user("What is the capital of France?", "deepseek-chat"),
//!         &mut reply,
//!         CancellationToken::new(),
//!     )
//!     .await;
//!
//!     println!("{}", reply.content());
//!     assert!(summary.is_completed());
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Events reach the consumer in wire order, one at a time
//! - Chunk boundaries never change what is decoded, even mid-character
//! - Malformed UTF-8 becomes U+FFFD; malformed JSON becomes plain text
//! - `on_done` and `on_error` are mutually exclusive and each fire at most once
//! - Cancellation closes the connection and silences all further callbacks
//!
//! ## Architecture
//!
//! - [`chatstream_core`] - Request types, session ids, correlation fields
//! - [`chatstream_streaming`] - Decoder, lifecycle driver, consumers
//! - [`chatstream_transport`] - `reqwest` transport and its configuration
//!
//! ## Examples
//!
//! ### Closures
//!
//! ```ignore
//! use chatstream::prelude::*;
//!
//! let mut consumer = CallbackConsumer::new()
//!     .message_handler(|text| print!("{text}"))
//!     .done_handler(|_| println!())
//!     .error_handler(|err| eprintln!("stream failed: {err}"));
//!
//! stream_chat(&transport, &request, &mut consumer, CancellationToken::new()).await;
//! ```
//!
//! ### Pull-style decoding
//!
//! ```ignore
//! use chatstream::prelude::*;
//! use futures::StreamExt;
//!
//! let mut events = response.bytes_stream().decode_events();
//! while let Some(event) = events.next().await {
//!     if let Some(text) = event?.message_text() {
//!         print!("{text}");
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Modules
// ============================================================================

/// One-call streaming over a transport.
pub mod session;

/// Logging setup for binaries and tests.
pub mod telemetry;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Request types and shared identifiers.
pub use chatstream_core as core;

/// Decoding and lifecycle.
pub use chatstream_streaming as streaming;

/// HTTP transport.
pub use chatstream_transport as transport;

// ============================================================================
// Type Re-exports (Flat)
// ============================================================================

// Requests
pub use chatstream_core::{ChatMessage, ChatRequest, Correlation, ReplyStatus, Role, SessionId};

// Decoding
pub use chatstream_streaming::{
    ByteSource, CallbackConsumer, ChannelConsumer, ConsumerEvent, DecoderConfig, EventDecoder,
    EventStream, EventStreamExt, LifecycleState, ReplyAccumulator, StreamConsumer, StreamDriver,
    StreamError, StreamEvent, StreamOutcome, StreamResult, StreamSource, StreamSummary,
};

// Transport
pub use chatstream_transport::{
    HttpByteSource, HttpTransport, Transport, TransportConfig, TransportError, TransportResult,
};

// Session
pub use session::{spawn_chat, stream_chat, ChatStreamer, StreamHandle};

pub use tokio_util::sync::CancellationToken;

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```ignore
/// use chatstream::prelude::*;
/// ```
pub mod prelude {
    // Requests
    pub use crate::core::{ChatMessage, ChatRequest, Correlation, ReplyStatus, Role, SessionId};

    // Decoding
    pub use crate::streaming::{
        CallbackConsumer, ChannelConsumer, ConsumerEvent, DecoderConfig, EventStreamExt,
        ReplyAccumulator, StreamConsumer, StreamError, StreamEvent, StreamOutcome, StreamSummary,
    };

    // Transport
    pub use crate::transport::{HttpTransport, Transport, TransportConfig, TransportError};

    // Session
    pub use crate::session::{spawn_chat, stream_chat, ChatStreamer, StreamHandle};

    pub use crate::CancellationToken;
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of chatstream.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
