//! Consumer callback interface.
//!
//! The decoder's only outward-facing contract. Callbacks are awaited one at
//! a time, in stream order, and never re-entered.

use crate::error::StreamError;
use async_trait::async_trait;
use chatstream_core::Correlation;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Receives decoded events for one stream.
///
/// `on_done` and `on_error` are mutually exclusive and each called at most
/// once per stream.
#[async_trait]
pub trait StreamConsumer: Send {
    /// A delta or pass-through payload arrived.
    async fn on_message(&mut self, text: &str);

    /// A thinking payload arrived. Ignored unless overridden.
    async fn on_thinking(&mut self, _text: &str) {}

    /// The stream completed.
    async fn on_done(&mut self, correlation: Option<&Correlation>);

    /// The stream failed.
    async fn on_error(&mut self, error: &StreamError);
}

/// A consumer callback, as a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsumerEvent {
    /// `on_message` was called.
    Message {
        /// Message text.
        text: String,
    },
    /// `on_thinking` was called.
    Thinking {
        /// Thinking text.
        text: String,
    },
    /// `on_done` was called.
    Done {
        /// Correlation fields, if any.
        correlation: Option<Correlation>,
    },
    /// `on_error` was called.
    Error {
        /// Rendered error.
        message: String,
    },
}

/// Forwards every callback over a bounded channel.
///
/// Sends wait for capacity, so a slow receiver slows the stream down
/// rather than growing a queue. A dropped receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    tx: mpsc::Sender<ConsumerEvent>,
}

impl ChannelConsumer {
    /// Create a consumer and the receiving half of its channel.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ConsumerEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    async fn send(&self, event: ConsumerEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::trace!("consumer channel closed, dropping event");
        }
    }
}

#[async_trait]
impl StreamConsumer for ChannelConsumer {
    async fn on_message(&mut self, text: &str) {
        self.send(ConsumerEvent::Message {
            text: text.to_string(),
        })
        .await;
    }

    async fn on_thinking(&mut self, text: &str) {
        self.send(ConsumerEvent::Thinking {
            text: text.to_string(),
        })
        .await;
    }

    async fn on_done(&mut self, correlation: Option<&Correlation>) {
        self.send(ConsumerEvent::Done {
            correlation: correlation.cloned(),
        })
        .await;
    }

    async fn on_error(&mut self, error: &StreamError) {
        self.send(ConsumerEvent::Error {
            message: error.to_string(),
        })
        .await;
    }
}

type TextHandler = Box<dyn FnMut(&str) + Send>;
type DoneHandler = Box<dyn FnMut(Option<&Correlation>) + Send>;
type ErrorHandler = Box<dyn FnMut(&StreamError) + Send>;

/// Consumer built from plain closures. Unset handlers do nothing.
///
/// ```rust
/// use chatstream_streaming::CallbackConsumer;
///
/// let consumer = CallbackConsumer::new()
///     .message_handler(|text| print!("{text}"))
///     .done_handler(|_| println!())
///     .error_handler(|err| eprintln!("stream failed: {err}"));
/// # drop(consumer);
/// ```
#[derive(Default)]
pub struct CallbackConsumer {
    message: Option<TextHandler>,
    thinking: Option<TextHandler>,
    done: Option<DoneHandler>,
    error: Option<ErrorHandler>,
}

impl CallbackConsumer {
    /// Create a consumer with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message handler.
    #[must_use]
    pub fn message_handler(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.message = Some(Box::new(f));
        self
    }

    /// Set the thinking handler.
    #[must_use]
    pub fn thinking_handler(mut self, f: impl FnMut(&str) + Send + 'static) -> Self {
        self.thinking = Some(Box::new(f));
        self
    }

    /// Set the completion handler.
    #[must_use]
    pub fn done_handler(mut self, f: impl FnMut(Option<&Correlation>) + Send + 'static) -> Self {
        self.done = Some(Box::new(f));
        self
    }

    /// Set the error handler.
    #[must_use]
    pub fn error_handler(mut self, f: impl FnMut(&StreamError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for CallbackConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackConsumer")
            .field("message", &self.message.is_some())
            .field("thinking", &self.thinking.is_some())
            .field("done", &self.done.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[async_trait]
impl StreamConsumer for CallbackConsumer {
    async fn on_message(&mut self, text: &str) {
        if let Some(f) = self.message.as_mut() {
            f(text);
        }
    }

    async fn on_thinking(&mut self, text: &str) {
        if let Some(f) = self.thinking.as_mut() {
            f(text);
        }
    }

    async fn on_done(&mut self, correlation: Option<&Correlation>) {
        if let Some(f) = self.done.as_mut() {
            f(correlation);
        }
    }

    async fn on_error(&mut self, error: &StreamError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }
}
