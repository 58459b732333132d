//! Opening streaming chat responses over HTTP.

use crate::config::TransportConfig;
use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use bytes::Bytes;
use chatstream_core::ChatRequest;
use chatstream_streaming::{ByteSource, StreamResult, StreamSource};
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};
use url::Url;

/// Opens a response body for a chat request.
///
/// Implementations return as soon as the response headers are in; the
/// body is read later through the returned [`ByteSource`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Body type handed to the decoder.
    type Source: ByteSource + 'static;

    /// Send `request` and open the response body.
    async fn open(&self, request: &ChatRequest) -> TransportResult<Self::Source>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    type Source = T::Source;

    async fn open(&self, request: &ChatRequest) -> TransportResult<Self::Source> {
        (**self).open(request).await
    }
}

/// `POST`s chat requests with `reqwest` and streams the body.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: TransportConfig,
    endpoint: Url,
}

impl HttpTransport {
    /// Build a transport and its HTTP client from a config.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid or the client
    /// cannot be built.
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connection_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Self::with_client(builder.build()?, config)
    }

    /// Build a transport around an existing client.
    ///
    /// Timeouts in `config` are not applied to a caller-supplied client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is invalid.
    pub fn with_client(client: Client, config: TransportConfig) -> TransportResult<Self> {
        let endpoint = config.endpoint()?;
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// The transport's configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// URL requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Source = HttpByteSource;

    async fn open(&self, request: &ChatRequest) -> TransportResult<HttpByteSource> {
        request.validate()?;

        debug!(
            url = %self.endpoint,
            model = %request.model,
            messages = request.messages.len(),
            "Opening chat stream"
        );

        let mut builder = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");

        if let Some(ref token) = self.config.auth_token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in &self.config.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Chat stream request rejected");
            return Err(TransportError::http(status.as_u16(), body));
        }
        let no_body = status == StatusCode::NO_CONTENT
            || status == StatusCode::RESET_CONTENT
            || response.content_length() == Some(0);
        if no_body {
            return Err(TransportError::MissingBody);
        }

        debug!(status = status.as_u16(), "Chat stream opened");
        Ok(HttpByteSource {
            status,
            inner: StreamSource::new(response.bytes_stream().boxed()),
        })
    }
}

/// Response body of an open HTTP chat stream.
///
/// Cancelling drops the body stream, which closes the connection.
#[derive(Debug)]
pub struct HttpByteSource {
    status: StatusCode,
    inner: StreamSource<BoxStream<'static, reqwest::Result<Bytes>>>,
}

impl HttpByteSource {
    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the body has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }
}

#[async_trait]
impl ByteSource for HttpByteSource {
    async fn next_chunk(&mut self) -> StreamResult<Option<Bytes>> {
        self.inner.next_chunk().await
    }

    async fn cancel(&mut self) {
        debug!("Cancelling chat stream body");
        self.inner.cancel().await;
    }
}
