//! Stream lifecycle.
//!
//! [`StreamDriver`] runs `read -> decode -> dispatch` until the source ends,
//! fails, or is cancelled, then flushes exactly once:
//!
//! ```text
//! Idle -> Reading -> (Reading | Draining) -> Terminated
//! ```
//!
//! Each chunk is decoded and dispatched to completion before the next read
//! starts, so the consumer sees events in wire order and never concurrently.

use crate::config::DecoderConfig;
use crate::consumer::StreamConsumer;
use crate::decoder::EventDecoder;
use crate::error::StreamError;
use crate::events::StreamEvent;
use crate::source::ByteSource;
use chatstream_core::Correlation;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Where the driver is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, nothing read yet.
    Idle,
    /// Reading and dispatching chunks.
    Reading,
    /// Source ended; flushing held input.
    Draining,
    /// Finished. Nothing more is dispatched.
    Terminated,
}

/// How a stream ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// Completion was signalled to the consumer.
    Completed {
        /// Correlation from a structured `done`, if one arrived.
        correlation: Option<Correlation>,
    },
    /// An error was signalled to the consumer.
    Failed,
    /// The caller cancelled; no terminal callback was made by the driver.
    Cancelled,
}

/// What happened over a stream's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    /// Terminal outcome, or `None` if the driver has not terminated.
    pub outcome: Option<StreamOutcome>,
    /// Body bytes read from the source.
    pub bytes_read: u64,
    /// Chunks read from the source.
    pub chunks_read: u64,
    /// Events handed to the consumer.
    pub events_dispatched: u64,
}

impl StreamSummary {
    /// Whether the stream completed successfully.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.outcome, Some(StreamOutcome::Completed { .. }))
    }
}

/// Drives one stream from its source to its consumer.
///
/// A driver handles a single stream; [`run`](Self::run) on a driver that
/// already left [`LifecycleState::Idle`] returns its summary unchanged.
/// The step methods ([`push_chunk`](Self::push_chunk),
/// [`finish`](Self::finish), [`fail`](Self::fail)) are public for callers
/// that receive bytes by push rather than pull.
#[derive(Debug)]
pub struct StreamDriver {
    decoder: EventDecoder,
    state: LifecycleState,
    cancel: CancellationToken,
    done_signaled: bool,
    correlation: Option<Correlation>,
    outcome: Option<StreamOutcome>,
    bytes_read: u64,
    chunks_read: u64,
    events_dispatched: u64,
}

impl Default for StreamDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDriver {
    /// Create a driver with default decoder settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a driver with the given decoder settings.
    #[must_use]
    pub fn with_config(config: DecoderConfig) -> Self {
        Self {
            decoder: EventDecoder::with_config(config),
            state: LifecycleState::Idle,
            cancel: CancellationToken::new(),
            done_signaled: false,
            correlation: None,
            outcome: None,
            bytes_read: 0,
            chunks_read: 0,
            events_dispatched: 0,
        }
    }

    /// Use an externally owned cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A handle that cancels this driver's stream.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the driver has terminated.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.state == LifecycleState::Terminated
    }

    /// Snapshot of counters and outcome.
    #[must_use]
    pub fn summary(&self) -> StreamSummary {
        StreamSummary {
            outcome: self.outcome.clone(),
            bytes_read: self.bytes_read,
            chunks_read: self.chunks_read,
            events_dispatched: self.events_dispatched,
        }
    }

    /// Read `source` to the end, dispatching to `consumer`.
    ///
    /// Cancellation is observed while waiting for the next chunk; it
    /// closes the source and terminates without further callbacks.
    pub async fn run<S, C>(&mut self, mut source: S, consumer: &mut C) -> StreamSummary
    where
        S: ByteSource,
        C: StreamConsumer + ?Sized,
    {
        if self.state != LifecycleState::Idle {
            warn!(state = ?self.state, "stream driver already used");
            return self.summary();
        }
        self.transition(LifecycleState::Reading);

        let cancel = self.cancel.clone();
        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                chunk = source.next_chunk() => Some(chunk),
            };

            match next {
                None => {
                    source.cancel().await;
                    self.cancel();
                }
                Some(Ok(Some(chunk))) => {
                    self.push_chunk(&chunk, consumer).await;
                    if self.is_terminated() {
                        source.cancel().await;
                    }
                }
                Some(Ok(None)) => self.finish(consumer).await,
                Some(Err(error)) => {
                    self.fail(error, consumer).await;
                    source.cancel().await;
                }
            }

            if self.is_terminated() {
                break;
            }
        }

        self.summary()
    }

    /// Decode one chunk and dispatch its events.
    ///
    /// A `[DONE]` sentinel or a decode failure terminates the driver.
    pub async fn push_chunk<C>(&mut self, chunk: &[u8], consumer: &mut C)
    where
        C: StreamConsumer + ?Sized,
    {
        if self.is_terminated() {
            return;
        }
        if self.state == LifecycleState::Idle {
            self.transition(LifecycleState::Reading);
        }

        self.bytes_read += chunk.len() as u64;
        self.chunks_read += 1;
        trace!(len = chunk.len(), "chunk received");

        let mut events = Vec::new();
        let result = self.decoder.feed(chunk, &mut events);
        self.dispatch_all(events, consumer).await;
        if self.is_terminated() {
            return;
        }

        if let Err(error) = result {
            self.fail(error, consumer).await;
        } else if self.decoder.is_terminated() {
            debug!("sentinel received, closing stream");
            self.terminate(StreamOutcome::Completed {
                correlation: self.correlation.clone(),
            });
        }
    }

    /// Flush held input at end of stream and signal completion.
    ///
    /// Completion is signalled only if no `done` event already did. Calling
    /// this on a terminated driver does nothing.
    pub async fn finish<C>(&mut self, consumer: &mut C)
    where
        C: StreamConsumer + ?Sized,
    {
        if self.is_terminated() {
            return;
        }
        self.transition(LifecycleState::Draining);

        let mut events = Vec::new();
        self.decoder.finish(&mut events);
        self.dispatch_all(events, consumer).await;

        self.signal_done(None, consumer).await;
        if self.is_terminated() {
            return;
        }
        self.terminate(StreamOutcome::Completed {
            correlation: self.correlation.clone(),
        });
    }

    /// Terminate with an error.
    ///
    /// The consumer's error handler runs unless completion was already
    /// signalled, in which case the failure is only logged.
    pub async fn fail<C>(&mut self, error: StreamError, consumer: &mut C)
    where
        C: StreamConsumer + ?Sized,
    {
        if self.is_terminated() || self.observe_cancellation() {
            return;
        }
        if self.done_signaled {
            warn!(%error, "stream failed after completion was signalled");
            self.terminate(StreamOutcome::Completed {
                correlation: self.correlation.clone(),
            });
            return;
        }

        warn!(%error, "stream failed");
        consumer.on_error(&error).await;
        self.terminate(StreamOutcome::Failed);
    }

    /// Terminate without calling the consumer.
    ///
    /// Buffered input that has not been dispatched is discarded.
    pub fn cancel(&mut self) {
        if self.is_terminated() {
            return;
        }
        self.cancel.cancel();
        debug!("stream cancelled");
        self.terminate(StreamOutcome::Cancelled);
    }

    async fn dispatch_all<C>(&mut self, events: Vec<StreamEvent>, consumer: &mut C)
    where
        C: StreamConsumer + ?Sized,
    {
        for event in events {
            // A callback may have cancelled the stream; the rest of the chunk is dropped.
            if self.is_terminated() || self.observe_cancellation() {
                return;
            }
            self.dispatch(event, consumer).await;
        }
    }

    async fn dispatch<C>(&mut self, event: StreamEvent, consumer: &mut C)
    where
        C: StreamConsumer + ?Sized,
    {
        trace!(kind = event.kind(), "dispatching event");
        self.events_dispatched += 1;

        match event {
            StreamEvent::Delta { text } | StreamEvent::Opaque { text } => {
                consumer.on_message(&text).await;
            }
            StreamEvent::Thinking { text } => consumer.on_thinking(&text).await,
            StreamEvent::Done { correlation } => self.signal_done(correlation, consumer).await,
            StreamEvent::SentinelDone => self.signal_done(None, consumer).await,
        }
    }

    async fn signal_done<C>(&mut self, correlation: Option<Correlation>, consumer: &mut C)
    where
        C: StreamConsumer + ?Sized,
    {
        if self.done_signaled || self.observe_cancellation() {
            return;
        }
        self.done_signaled = true;
        self.correlation = correlation;
        consumer.on_done(self.correlation.as_ref()).await;
    }

    /// Terminate as cancelled if the token fired.
    fn observe_cancellation(&mut self) -> bool {
        if !self.cancel.is_cancelled() {
            return false;
        }
        self.cancel();
        true
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(from = ?self.state, to = ?next, "stream state change");
        self.state = next;
    }

    fn terminate(&mut self, outcome: StreamOutcome) {
        self.transition(LifecycleState::Terminated);
        debug!(
            outcome = ?outcome,
            bytes_read = self.bytes_read,
            events = self.events_dispatched,
            "stream terminated"
        );
        self.outcome = Some(outcome);
    }
}
