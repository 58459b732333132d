//! Pull-based byte sources.
//!
//! A [`ByteSource`] is the decoder's view of the transport: something that
//! hands over the next chunk of the response body, or `None` at EOF.

use crate::error::{StreamError, StreamResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt::Display;

/// An open, readable response body.
#[async_trait]
pub trait ByteSource: Send {
    /// Wait for the next chunk. `Ok(None)` means the body ended cleanly.
    async fn next_chunk(&mut self) -> StreamResult<Option<Bytes>>;

    /// Tear down the underlying connection. Best-effort; later reads
    /// return `Ok(None)`.
    async fn cancel(&mut self) {}
}

#[async_trait]
impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    async fn next_chunk(&mut self) -> StreamResult<Option<Bytes>> {
        (**self).next_chunk().await
    }

    async fn cancel(&mut self) {
        (**self).cancel().await;
    }
}

/// Adapts any fallible byte [`Stream`] into a [`ByteSource`].
///
/// Cancelling drops the inner stream, which closes whatever connection it
/// owns.
pub struct StreamSource<S> {
    inner: Option<S>,
}

impl<S> StreamSource<S> {
    /// Wrap a byte stream.
    pub fn new(inner: S) -> Self {
        Self { inner: Some(inner) }
    }

    /// Whether [`ByteSource::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_none()
    }
}

impl<S> std::fmt::Debug for StreamSource<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSource")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[async_trait]
impl<S, E> ByteSource for StreamSource<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin + Send,
    E: Display + Send,
{
    async fn next_chunk(&mut self) -> StreamResult<Option<Bytes>> {
        let Some(inner) = self.inner.as_mut() else {
            return Ok(None);
        };
        match inner.next().await {
            Some(Ok(bytes)) => Ok(Some(bytes)),
            Some(Err(error)) => Err(StreamError::transport(error)),
            None => Ok(None),
        }
    }

    async fn cancel(&mut self) {
        self.inner = None;
    }
}
