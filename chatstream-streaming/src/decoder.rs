//! Synchronous event decoder.
//!
//! Glues the UTF-8 converter, the block extractor and the payload
//! interpreter together. It does no I/O and never awaits; the async
//! driver and the `Stream` adapter both sit on top of it.

use crate::config::DecoderConfig;
use crate::error::{StreamError, StreamResult};
use crate::events::StreamEvent;
use crate::extractor::BlockExtractor;
use crate::payload::parse_block;
use crate::utf8::Utf8Decoder;

/// Decoder state for one stream.
///
/// ```rust
/// use chatstream_streaming::{EventDecoder, StreamEvent};
///
/// let mut decoder = EventDecoder::new();
/// let mut events = Vec::new();
/// decoder.feed(b"data: {\"type\":\"delta\",\"text\":\"hi\"}\n\ndata: ta", &mut events).unwrap();
/// decoder.feed(b"il", &mut events).unwrap();
/// decoder.finish(&mut events);
/// assert_eq!(events, vec![StreamEvent::delta("hi"), StreamEvent::opaque("tail")]);
/// ```
#[derive(Debug, Default)]
pub struct EventDecoder {
    config: DecoderConfig,
    utf8: Utf8Decoder,
    blocks: BlockExtractor,
    terminated: bool,
    finished: bool,
}

impl EventDecoder {
    /// Create a decoder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with the given settings.
    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode one chunk, appending every completed event to `events`.
    ///
    /// Events are appended in stream order. After a `[DONE]` sentinel the
    /// rest of the chunk and every later chunk is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::BufferOverflow`] when the undelimited tail
    /// grows past [`DecoderConfig::max_buffer_bytes`]. Events completed
    /// earlier in the same chunk are still appended.
    pub fn feed(&mut self, chunk: &[u8], events: &mut Vec<StreamEvent>) -> StreamResult<()> {
        if self.is_closed() {
            return Ok(());
        }

        let text = self.utf8.feed(chunk);
        self.blocks.push(&text);
        self.drain_blocks(events);

        let held = self.blocks.buffered_len();
        if !self.terminated && held > self.config.max_buffer_bytes {
            self.blocks.clear();
            self.finished = true;
            return Err(StreamError::BufferOverflow {
                limit: self.config.max_buffer_bytes,
            });
        }

        Ok(())
    }

    /// Flush everything still held at end of input.
    ///
    /// Completes a truncated code point, then treats any non-blank
    /// remainder as one last block. Only the first call does anything.
    pub fn finish(&mut self, events: &mut Vec<StreamEvent>) {
        if self.is_closed() {
            self.finished = true;
            return;
        }
        self.finished = true;

        let tail = self.utf8.finish();
        self.blocks.push(&tail);
        self.drain_blocks(events);

        if self.terminated {
            return;
        }
        if let Some(rest) = self.blocks.take_remainder() {
            if let Some(event) = self.accept(parse_block(&rest)) {
                events.push(event);
            }
        }
    }

    /// Whether the `[DONE]` sentinel has been seen.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Whether [`finish`](Self::finish) has run or decoding failed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Bytes of decoded text waiting for a delimiter.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.blocks.buffered_len()
    }

    fn is_closed(&self) -> bool {
        self.terminated || self.finished
    }

    fn drain_blocks(&mut self, events: &mut Vec<StreamEvent>) {
        while let Some(block) = self.blocks.next_block() {
            let Some(event) = self.accept(parse_block(&block)) else {
                continue;
            };
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                self.terminated = true;
                self.blocks.clear();
                break;
            }
        }
    }

    fn accept(&self, event: Option<StreamEvent>) -> Option<StreamEvent> {
        match event {
            Some(StreamEvent::Thinking { .. }) if !self.config.emit_thinking => None,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const STREAM: &str = concat!(
        ": keepalive\n\n",
        "data: {\"type\":\"thinking\",\"text\":\"let me see\"}\n\n",
        "data: {\"type\":\"delta\",\"text\":\"Grüße, \"}\n\n",
        "event: message\nid: 4\ndata: {\"type\":\"delta\",\"text\":\"世界 🦀\"}\n\n",
        "\n\n",
        "data: raw fallback\n\n",
        "data: line one\ndata: line two\n\n",
        "data: {\"type\":\"done\",\"id\":\"abc\"}\n\n",
        "data: unterminated tail",
    );

    fn decode_in_chunks(input: &[u8], size: usize) -> Vec<StreamEvent> {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();
        for chunk in input.chunks(size) {
            decoder.feed(chunk, &mut events).unwrap();
        }
        decoder.finish(&mut events);
        events
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(5)]
    #[case(13)]
    #[case(64)]
    fn test_chunk_boundary_invariance(#[case] size: usize) {
        let whole = decode_in_chunks(STREAM.as_bytes(), STREAM.len());
        assert_eq!(decode_in_chunks(STREAM.as_bytes(), size), whole);
    }

    #[test]
    fn test_full_stream_sequence() {
        let events = decode_in_chunks(STREAM.as_bytes(), STREAM.len());
        let kinds: Vec<&str> = events.iter().map(StreamEvent::kind).collect();
        assert_eq!(
            kinds,
            vec!["thinking", "delta", "delta", "opaque", "opaque", "done", "opaque"]
        );
        assert_eq!(events[2], StreamEvent::delta("世界 🦀"));
        assert_eq!(events[4], StreamEvent::opaque("line one\nline two"));
        assert_eq!(events[6], StreamEvent::opaque("unterminated tail"));
    }

    #[test]
    fn test_delta_not_emitted_before_delimiter_completes() {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();

        decoder.feed(b"data: {\"typ", &mut events).unwrap();
        assert!(events.is_empty());
        decoder.feed(b"e\":\"delta\",\"text\":\"hi\"}\n", &mut events).unwrap();
        assert!(events.is_empty());
        decoder.feed(b"\n", &mut events).unwrap();
        assert_eq!(events, vec![StreamEvent::delta("hi")]);
    }

    #[test]
    fn test_sentinel_stops_decoding() {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();

        decoder
            .feed(b"data: a\n\ndata: [DONE]\n\ndata: b\n\n", &mut events)
            .unwrap();
        decoder.feed(b"data: c\n\n", &mut events).unwrap();
        decoder.finish(&mut events);

        assert_eq!(
            events,
            vec![StreamEvent::opaque("a"), StreamEvent::SentinelDone]
        );
        assert!(decoder.is_terminated());
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_structured_done_does_not_stop_decoding() {
        let events = decode_in_chunks(b"data: {\"type\":\"done\"}\n\ndata: late\n\n", 4);
        assert_eq!(
            events,
            vec![
                StreamEvent::Done { correlation: None },
                StreamEvent::opaque("late")
            ]
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();
        decoder.feed(b"data: tail", &mut events).unwrap();
        decoder.finish(&mut events);
        decoder.finish(&mut events);
        assert_eq!(events, vec![StreamEvent::opaque("tail")]);

        decoder.feed(b"\n\ndata: more\n\n", &mut events).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_truncated_code_point_in_tail() {
        let mut decoder = EventDecoder::new();
        let mut events = Vec::new();
        decoder.feed(b"data: ab\xE2\x82", &mut events).unwrap();
        decoder.finish(&mut events);
        assert_eq!(events, vec![StreamEvent::opaque("ab\u{FFFD}")]);
    }

    #[test]
    fn test_thinking_can_be_suppressed() {
        let mut decoder = EventDecoder::with_config(DecoderConfig::new().emit_thinking(false));
        let mut events = Vec::new();
        decoder
            .feed(
                b"data: {\"type\":\"thinking\",\"text\":\"x\"}\n\ndata: y\n\n",
                &mut events,
            )
            .unwrap();
        assert_eq!(events, vec![StreamEvent::opaque("y")]);
    }

    #[test]
    fn test_buffer_overflow_keeps_earlier_events() {
        let mut decoder = EventDecoder::with_config(DecoderConfig::new().max_buffer_bytes(16));
        let mut events = Vec::new();

        let result = decoder.feed(b"data: ok\n\ndata: this tail is far too long", &mut events);
        assert!(matches!(result, Err(StreamError::BufferOverflow { limit: 16 })));
        assert_eq!(events, vec![StreamEvent::opaque("ok")]);
        assert!(decoder.is_finished());

        decoder.finish(&mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(decode_in_chunks(b"", 1).is_empty());
        assert!(decode_in_chunks(b"\n\n\n\n", 1).is_empty());
    }
}
