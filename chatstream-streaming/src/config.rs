//! Decoder configuration.

/// Default ceiling for text held while waiting for a block delimiter.
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 10 * 1024 * 1024;

/// Configuration for an [`EventDecoder`](crate::EventDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum undelimited text the decoder will hold.
    pub max_buffer_bytes: usize,
    /// Whether thinking payloads are dispatched or dropped.
    pub emit_thinking: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
            emit_thinking: true,
        }
    }
}

impl DecoderConfig {
    /// Create a default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the buffer ceiling.
    #[must_use]
    pub fn max_buffer_bytes(mut self, bytes: usize) -> Self {
        self.max_buffer_bytes = bytes;
        self
    }

    /// Enable or disable the thinking channel.
    #[must_use]
    pub fn emit_thinking(mut self, emit: bool) -> Self {
        self.emit_thinking = emit;
        self
    }
}
