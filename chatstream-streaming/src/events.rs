//! Semantic events produced by the decoder.

use chatstream_core::Correlation;
use serde::{Deserialize, Serialize};

/// One interpreted event block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Incremental text from a `{"type":"delta"}` payload.
    Delta {
        /// The text fragment.
        text: String,
    },

    /// Intermediate reasoning from a `{"type":"thinking"}` payload.
    Thinking {
        /// The reasoning fragment.
        text: String,
    },

    /// A payload the decoder does not understand, passed through verbatim.
    Opaque {
        /// Trimmed payload text.
        text: String,
    },

    /// A structured `{"type":"done"}` payload.
    Done {
        /// Fields the backend attached, if any.
        correlation: Option<Correlation>,
    },

    /// The literal `[DONE]` sentinel.
    SentinelDone,
}

impl StreamEvent {
    /// Create a delta event.
    pub fn delta(text: impl Into<String>) -> Self {
        Self::Delta { text: text.into() }
    }

    /// Create a thinking event.
    pub fn thinking(text: impl Into<String>) -> Self {
        Self::Thinking { text: text.into() }
    }

    /// Create an opaque event.
    pub fn opaque(text: impl Into<String>) -> Self {
        Self::Opaque { text: text.into() }
    }

    /// Text delivered on the message channel, if any.
    #[must_use]
    pub fn message_text(&self) -> Option<&str> {
        match self {
            Self::Delta { text } | Self::Opaque { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this event signals completion.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::SentinelDone)
    }

    /// Whether nothing after this event should be decoded.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SentinelDone)
    }

    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Delta { .. } => "delta",
            Self::Thinking { .. } => "thinking",
            Self::Opaque { .. } => "opaque",
            Self::Done { .. } => "done",
            Self::SentinelDone => "sentinel_done",
        }
    }
}
