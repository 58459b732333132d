//! # chatstream-streaming
//!
//! Incremental event-stream decoding for chunked chat responses.
//!
//! Bytes arrive in arbitrary chunks; chunk edges may split a block, a
//! line, or a single UTF-8 character. This crate turns them into an
//! ordered sequence of events, each dispatched exactly once.
//!
//! ## Core Concepts
//!
//! - **[`Utf8Decoder`]**: byte-to-text conversion that never fails on a chunk edge
//! - **[`BlockExtractor`]**: splits text on blank lines with a resume offset
//! - **[`payload`]**: joins `data:` lines and interprets `[DONE]` and JSON payloads
//! - **[`EventDecoder`]**: the three stages above, synchronous
//! - **[`StreamDriver`]**: the `Idle -> Reading -> Draining -> Terminated` lifecycle
//! - **[`StreamConsumer`]**: the callback interface events are dispatched to
//! - **[`EventStream`]**: the same decoder as a `futures::Stream`
//!
//! ## Example - Callbacks
//!
//! ```ignore
//! use chatstream_streaming::{ReplyAccumulator, StreamDriver, StreamSource};
//!
//! let mut reply = ReplyAccumulator::new();
//! let summary = StreamDriver::new()
//!     .run(StreamSource::new(response.bytes_stream()), &mut reply)
//!     .await;
//! println!("{} ({:?})", reply.content(), summary.outcome);
//! ```
//!
//! ## Example - Pull
//!
//! ```ignore
//! use chatstream_streaming::{EventStreamExt, StreamEvent};
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
#![deny(unsafe_code)]

pub mod config;
pub mod consumer;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod event_stream;
pub mod events;
pub mod extractor;
pub mod partial_reply;
pub mod payload;
pub mod source;
pub mod utf8;

// Re-exports
pub use config::DecoderConfig;
pub use consumer::{CallbackConsumer, ChannelConsumer, ConsumerEvent, StreamConsumer};
pub use decoder::EventDecoder;
pub use driver::{LifecycleState, StreamDriver, StreamOutcome, StreamSummary};
pub use error::{StreamError, StreamResult};
pub use event_stream::{EventStream, EventStreamExt};
pub use events::StreamEvent;
pub use extractor::BlockExtractor;
pub use partial_reply::ReplyAccumulator;
pub use source::{ByteSource, StreamSource};
pub use utf8::Utf8Decoder;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ByteSource, CallbackConsumer, ChannelConsumer, ConsumerEvent, DecoderConfig,
        EventStreamExt, ReplyAccumulator, StreamConsumer, StreamDriver, StreamError,
        StreamEvent, StreamOutcome, StreamResult, StreamSource,
    };
}
