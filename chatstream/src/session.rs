//! One-call chat streaming.
//!
//! These functions join a [`Transport`], a [`StreamDriver`] and a
//! [`StreamConsumer`]: open the response, decode it, dispatch events, and
//! report how the stream ended.
//!
//! # Examples
//!
//! ## Awaiting a stream
//!
//! ```rust,ignore
//! use chatstream::prelude::*;
//!
//! let transport = HttpTransport::new(TransportConfig::from_env()?)?;
//! let mut reply = ReplyAccumulator::new();
//!
//! let summary = stream_chat(
//!     &transport,
//!     &ChatRequest::user("Write a haiku", "deepseek-chat"),
//!     &mut reply,
//!     CancellationToken::new(),
//! )
//! .await;
//!
//! println!("{} ({:?})", reply.content(), summary.outcome);
//! ```
//!
//! ## Running in the background
//!
//! ```rust,ignore
//! let (consumer, mut events) = ChannelConsumer::new(32);
//! let handle = spawn_chat(transport, request, consumer);
//!
//! while let Some(event) = events.recv().await {
//!     if user_pressed_stop() {
//!         handle.cancel();
//!     }
//! }
//! let (summary, _consumer) = handle.join().await?;
//! ```

use chatstream_core::ChatRequest;
use chatstream_streaming::{
    DecoderConfig, StreamConsumer, StreamDriver, StreamError, StreamResult, StreamSummary,
};
use chatstream_transport::Transport;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

/// Open `request` on `transport` and stream the reply into `consumer`.
///
/// An open failure reaches the consumer as a single `on_error` before any
/// chunk is read. Cancelling `cancel` at any point ends the stream without
/// further callbacks.
pub async fn stream_chat<T, C>(
    transport: &T,
    request: &ChatRequest,
    consumer: &mut C,
    cancel: CancellationToken,
) -> StreamSummary
where
    T: Transport + ?Sized,
    C: StreamConsumer + ?Sized,
{
    let driver = StreamDriver::new().with_cancellation(cancel);
    drive(transport, request, consumer, driver)
        .instrument(tracing::debug_span!("chat_stream", model = %request.model))
        .await
}

/// Run [`stream_chat`] on a new tokio task.
///
/// The consumer is handed back by [`StreamHandle::join`].
pub fn spawn_chat<T, C>(transport: T, request: ChatRequest, consumer: C) -> StreamHandle<C>
where
    T: Transport + 'static,
    C: StreamConsumer + 'static,
{
    ChatStreamer::new(transport).spawn(request, consumer)
}

/// A transport paired with decoder settings.
#[derive(Debug, Clone)]
pub struct ChatStreamer<T> {
    transport: T,
    config: DecoderConfig,
}

impl<T> ChatStreamer<T> {
    /// Stream over `transport` with default decoder settings.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: DecoderConfig::default(),
        }
    }

    /// Set the decoder settings.
    #[must_use]
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The decoder settings.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

impl<T: Transport> ChatStreamer<T> {
    /// Stream one request. See [`stream_chat`].
    pub async fn stream<C>(
        &self,
        request: &ChatRequest,
        consumer: &mut C,
        cancel: CancellationToken,
    ) -> StreamSummary
    where
        C: StreamConsumer + ?Sized,
    {
        let driver = StreamDriver::with_config(self.config.clone()).with_cancellation(cancel);
        drive(&self.transport, request, consumer, driver)
            .instrument(tracing::debug_span!("chat_stream", model = %request.model))
            .await
    }
}

impl<T: Transport + 'static> ChatStreamer<T> {
    /// Stream one request on a new tokio task. See [`spawn_chat`].
    pub fn spawn<C>(self, request: ChatRequest, mut consumer: C) -> StreamHandle<C>
    where
        C: StreamConsumer + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let summary = self.stream(&request, &mut consumer, token).await;
            (summary, consumer)
        });
        StreamHandle { cancel, task }
    }
}

async fn drive<T, C>(
    transport: &T,
    request: &ChatRequest,
    consumer: &mut C,
    mut driver: StreamDriver,
) -> StreamSummary
where
    T: Transport + ?Sized,
    C: StreamConsumer + ?Sized,
{
    let cancel = driver.cancellation_token();
    let opened = tokio::select! {
        biased;
        () = cancel.cancelled() => None,
        opened = transport.open(request) => Some(opened),
    };

    match opened {
        None => {
            debug!("cancelled while opening");
            driver.cancel();
            driver.summary()
        }
        Some(Ok(source)) => driver.run(source, consumer).await,
        Some(Err(error)) => {
            driver.fail(StreamError::from(error), consumer).await;
            driver.summary()
        }
    }
}

/// A chat stream running on its own task.
///
/// Dropping the handle does not stop the stream; call
/// [`cancel`](Self::cancel) for that.
#[derive(Debug)]
pub struct StreamHandle<C> {
    cancel: CancellationToken,
    task: JoinHandle<(StreamSummary, C)>,
}

impl<C> StreamHandle<C> {
    /// Stop the stream. No consumer callback runs after this returns,
    /// except one already in progress.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this stream.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stream to end.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Other`] if the task panicked.
    pub async fn join(self) -> StreamResult<(StreamSummary, C)> {
        self.task.await.map_err(StreamError::from_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chatstream_streaming::{ChannelConsumer, ConsumerEvent, StreamOutcome, StreamSource};
    use chatstream_transport::{TransportError, TransportResult};
    use futures::stream::{self, BoxStream};
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    type ChunkSource = StreamSource<BoxStream<'static, Result<Bytes, std::io::Error>>>;

    /// Serves a fixed body, or fails to open.
    struct FixedTransport {
        body: Option<&'static [u8]>,
        opens: AtomicUsize,
    }

    impl FixedTransport {
        fn serving(body: &'static [u8]) -> Self {
            Self {
                body: Some(body),
                opens: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                body: None,
                opens: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transport for FixedTransport {
        type Source = ChunkSource;

        async fn open(&self, request: &ChatRequest) -> TransportResult<ChunkSource> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            request.validate()?;
            let body = self.body.ok_or(TransportError::MissingBody)?;
            let chunks: Vec<Result<Bytes, std::io::Error>> = body
                .chunks(3)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            Ok(StreamSource::new(stream::iter(chunks).boxed()))
        }
    }

    /// Never finishes opening.
    struct HangingTransport;

    #[async_trait]
    impl Transport for HangingTransport {
        type Source = ChunkSource;

        async fn open(&self, _request: &ChatRequest) -> TransportResult<ChunkSource> {
            futures::future::pending().await
        }
    }

    fn drain(mut rx: tokio::sync::mpsc::Receiver<ConsumerEvent>) -> Vec<ConsumerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_stream_chat_dispatches_in_order() {
        let transport = FixedTransport::serving(
            b"data: {\"type\":\"delta\",\"text\":\"Hel\"}\n\n\
              data: {\"type\":\"delta\",\"text\":\"lo\"}\n\n\
              data: [DONE]\n\n",
        );
        let (mut consumer, rx) = ChannelConsumer::new(16);

        let summary = stream_chat(
            &transport,
            &ChatRequest::user("hi", "m"),
            &mut consumer,
            CancellationToken::new(),
        )
        .await;

        assert!(summary.is_completed());
        assert_eq!(summary.events_dispatched, 3);
        drop(consumer);
        assert_eq!(
            drain(rx),
            vec![
                ConsumerEvent::Message { text: "Hel".into() },
                ConsumerEvent::Message { text: "lo".into() },
                ConsumerEvent::Done { correlation: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_open_failure_reports_error_once() {
        let transport = FixedTransport::failing();
        let (mut consumer, rx) = ChannelConsumer::new(16);

        let summary = stream_chat(
            &transport,
            &ChatRequest::user("hi", "m"),
            &mut consumer,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(summary.outcome, Some(StreamOutcome::Failed));
        assert_eq!(summary.chunks_read, 0);
        drop(consumer);
        assert_eq!(
            drain(rx),
            vec![ConsumerEvent::Error {
                message: "No response body".into()
            }]
        );
    }

    #[tokio::test]
    async fn test_invalid_request_fails_before_reading() {
        let transport = FixedTransport::serving(b"data: never\n\n");
        let (mut consumer, rx) = ChannelConsumer::new(16);

        let summary = stream_chat(
            &transport,
            &ChatRequest::new(Vec::new(), "m"),
            &mut consumer,
            CancellationToken::new(),
        )
        .await;

        assert_eq!(summary.outcome, Some(StreamOutcome::Failed));
        drop(consumer);
        let events = drain(rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ConsumerEvent::Error { .. }));
    }

    #[tokio::test]
    async fn test_cancel_while_opening_is_silent() {
        let (consumer, rx) = ChannelConsumer::new(16);
        let handle = spawn_chat(HangingTransport, ChatRequest::user("hi", "m"), consumer);

        handle.cancel();
        let (summary, consumer) = handle.join().await.unwrap();

        assert_eq!(summary.outcome, Some(StreamOutcome::Cancelled));
        drop(consumer);
        assert!(drain(rx).is_empty());
    }

    #[tokio::test]
    async fn test_spawn_returns_consumer() {
        let transport = Arc::new(FixedTransport::serving(b"data: one\n\ndata: two"));
        let (consumer, rx) = ChannelConsumer::new(16);

        let handle = spawn_chat(Arc::clone(&transport), ChatRequest::user("hi", "m"), consumer);
        let (summary, consumer) = handle.join().await.unwrap();

        assert!(summary.is_completed());
        assert_eq!(transport.opens.load(Ordering::SeqCst), 1);
        drop(consumer);
        assert_eq!(
            drain(rx),
            vec![
                ConsumerEvent::Message { text: "one".into() },
                ConsumerEvent::Message { text: "two".into() },
                ConsumerEvent::Done { correlation: None },
            ]
        );
    }

    #[tokio::test]
    async fn test_streamer_applies_decoder_config() {
        let transport = FixedTransport::serving(
            b"data: {\"type\":\"thinking\",\"text\":\"hmm\"}\n\ndata: {\"type\":\"delta\",\"text\":\"ok\"}\n\n",
        );
        let streamer =
            ChatStreamer::new(transport).with_config(DecoderConfig::new().emit_thinking(false));
        let (mut consumer, rx) = ChannelConsumer::new(16);

        let summary = streamer
            .stream(&ChatRequest::user("hi", "m"), &mut consumer, CancellationToken::new())
            .await;

        assert!(summary.is_completed());
        assert_eq!(streamer.transport().opens.load(Ordering::SeqCst), 1);
        drop(consumer);
        assert_eq!(
            drain(rx),
            vec![
                ConsumerEvent::Message { text: "ok".into() },
                ConsumerEvent::Done { correlation: None },
            ]
        );
    }
}
