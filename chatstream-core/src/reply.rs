//! Reply lifecycle status.

use serde::{Deserialize, Serialize};

/// Where an assistant reply is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    /// Request sent, nothing received yet.
    #[default]
    Pending,
    /// At least one fragment has arrived.
    Streaming,
    /// The stream completed.
    Success,
    /// The stream failed.
    Error,
}

impl ReplyStatus {
    /// Whether no further transitions are expected.
    #[must_use]
    pub fn is_final(self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}
