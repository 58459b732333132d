//! # chatstream-core
//!
//! Core types shared across the chatstream crates.
//!
//! - **Requests**: the JSON body POSTed to a streaming chat endpoint
//! - **Identifiers**: session ids that may be numeric or textual
//! - **Correlation**: fields attached to a structured `done` event
//! - **Reply status**: lifecycle of an assistant reply
//!
//! ## Example
//!
//! ```rust
//! use chatstream_core::{ChatMessage, ChatRequest};
//!
//! let request = ChatRequest::new(vec![ChatMessage::user("Hello!")], "gpt-4o")
//!     .with_session("session-1");
//! request.validate().expect("complete request");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod correlation;
pub mod errors;
pub mod identifier;
pub mod reply;
pub mod request;

// Re-exports for convenience
pub use correlation::Correlation;
pub use errors::{RequestError, Result};
pub use identifier::{now_utc, SessionId};
pub use reply::ReplyStatus;
pub use request::{ChatMessage, ChatRequest, Role};
