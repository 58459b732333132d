//! Pull-style decoding of byte streams.
//!
//! [`EventStream`] exposes the decoder as a `futures::Stream` of events for
//! callers that prefer `while let Some(event) = stream.next().await` over
//! the callback interface.

use crate::config::DecoderConfig;
use crate::decoder::EventDecoder;
use crate::error::{StreamError, StreamResult};
use crate::events::StreamEvent;
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

pin_project! {
    /// Stream adapter that decodes events from a byte stream.
    ///
    /// Ends after the `[DONE]` sentinel, after the flush at EOF, or after
    /// yielding one error.
    pub struct EventStream<S> {
        #[pin]
        inner: S,
        decoder: EventDecoder,
        pending: VecDeque<StreamEvent>,
        error: Option<StreamError>,
        finished: bool,
    }
}

impl<S> EventStream<S> {
    /// Decode `inner` with default settings.
    pub fn new(inner: S) -> Self {
        Self::with_config(inner, DecoderConfig::default())
    }

    /// Decode `inner` with the given settings.
    pub fn with_config(inner: S, config: DecoderConfig) -> Self {
        Self {
            inner,
            decoder: EventDecoder::with_config(config),
            pending: VecDeque::new(),
            error: None,
            finished: false,
        }
    }
}

impl<S, E> Stream for EventStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    type Item = StreamResult<StreamEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // Events decoded earlier go out before any error or EOF.
            if let Some(event) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(event)));
            }
            if let Some(error) = this.error.take() {
                return Poll::Ready(Some(Err(error)));
            }
            if *this.finished {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let mut events = Vec::new();
                    let result = this.decoder.feed(&bytes, &mut events);
                    this.pending.extend(events);
                    if let Err(error) = result {
                        *this.error = Some(error);
                        *this.finished = true;
                    } else if this.decoder.is_terminated() {
                        *this.finished = true;
                    }
                }
                Poll::Ready(Some(Err(error))) => {
                    *this.error = Some(StreamError::transport(error));
                    *this.finished = true;
                }
                Poll::Ready(None) => {
                    let mut events = Vec::new();
                    this.decoder.finish(&mut events);
                    this.pending.extend(events);
                    *this.finished = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Extension trait for decoding byte streams.
pub trait EventStreamExt: Sized {
    /// Decode this byte stream into events.
    fn decode_events(self) -> EventStream<Self>;
}

impl<S, E> EventStreamExt for S
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    fn decode_events(self) -> EventStream<Self> {
        EventStream::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{stream, StreamExt};
    use pretty_assertions::assert_eq;

    fn bytes_stream(
        chunks: &[&'static [u8]],
    ) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Unpin {
        let owned: Vec<Result<Bytes, std::io::Error>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(*c))).collect();
        stream::iter(owned)
    }

    #[tokio::test]
    async fn test_yields_events_then_ends() {
        let events: Vec<_> = bytes_stream(&[
            b"data: a\n",
            b"\ndata: {\"type\":\"delta\",\"text\":\"b\"}",
        ])
        .decode_events()
        .collect()
        .await;

        let events: Vec<StreamEvent> = events.into_iter().map(Result::unwrap).collect();
        assert_eq!(events, vec![StreamEvent::opaque("a"), StreamEvent::delta("b")]);
    }

    #[tokio::test]
    async fn test_ends_after_sentinel() {
        let mut stream =
            bytes_stream(&[b"data: x\n\ndata: [DONE]\n\n", b"data: y\n\n"]).decode_events();

        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::opaque("x"));
        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::SentinelDone);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_error_after_pending_events() {
        let chunks = vec![
            Ok(Bytes::from_static(b"data: first\n\n")),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe")),
        ];
        let mut stream = stream::iter(chunks).decode_events();

        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::opaque("first"));
        assert!(matches!(stream.next().await, Some(Err(StreamError::Transport(_)))));
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_overflow_surfaces_as_error() {
        let mut stream = EventStream::with_config(
            bytes_stream(&[b"data: ok\n\n0123456789"]),
            DecoderConfig::new().max_buffer_bytes(4),
        );

        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::opaque("ok"));
        assert!(matches!(
            stream.next().await,
            Some(Err(StreamError::BufferOverflow { limit: 4 }))
        ));
        assert!(stream.next().await.is_none());
    }
}
