//! Live requests over hyper-util.
//!
//! - [`HttpClient`] - Execute a request, leaving the body unread
//! - [`HttpClientExt::send`] - Execute a request and interpret a [`ResponseSpec`]
//! - [`HyperClient`] - Pooled HTTPS client, extensible with Tower layers

use std::error::Error as StdError;
use std::future::Future;
use std::task::{Context, Poll};

use bytes::Bytes;
use decant_core::{
    ResponseMetadata, ResponseSpec, StreamingBody, StreamingResponse, interpret_selected,
};
use futures_util::TryStreamExt;
use futures_util::future::{BoxFuture, FutureExt};
use http_body_util::{BodyStream, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::util::BoxCloneSyncService;
use tower::{Layer, ServiceExt};
use tower_service::Service;
use tracing::{debug, trace};

use crate::{Async, ClientConfig, Error, ReceivedBody, Result, connector::https_connector};

/// Executes requests.
///
/// The response is returned as soon as its head arrives; the body is read
/// only when a spec asks for it.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the streaming response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`], [`Error::Tls`] or [`Error::Connection`]
    /// when no response head is received.
    fn execute(
        &self,
        request: http::Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send;
}

/// Spec-driven responses for every [`HttpClient`].
pub trait HttpClientExt: HttpClient {
    /// Execute a request and turn its response into a value with `spec`.
    ///
    /// `spec` is resolved once against the response head. The body is then
    /// discarded, buffered, written to a file or handed back as a stream,
    /// whichever the selected leaf needs, and that same resolution is
    /// interpreted.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the selected leaf cannot be
    /// executed.
    fn send<T>(
        &self,
        request: http::Request<Bytes>,
        spec: &ResponseSpec<T, StreamingBody>,
    ) -> impl Future<Output = Result<T>> + Send
    where
        T: Send + 'static,
    {
        async move {
            let response = self.execute(request).await?;
            let selected = spec.resolve_for(response.metadata());
            let (metadata, body) = ReceivedBody::receive(response, selected.kind()).await?;
            interpret_selected(&Async, selected, body, &metadata).await
        }
    }
}

impl<C: HttpClient> HttpClientExt for C {}

/// The service a [`HyperClient`] calls, with every layer applied.
pub type BoxedService = BoxCloneSyncService<http::Request<Bytes>, StreamingResponse, Error>;

/// The innermost service: one request over the pooled hyper client.
#[derive(Clone)]
struct Transport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl Transport {
    fn new(config: ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.idle_timeout)
            .pool_max_idle_per_host(config.idle_per_host)
            .build(https_connector(&config));
        Self { inner, config }
    }

    async fn head(self, request: http::Request<Bytes>) -> Result<StreamingResponse> {
        trace!(method = %request.method(), uri = %request.uri(), "sending request");
        let pending = self.inner.request(request.map(Full::new));

        let response = tokio::time::timeout(self.config.head_timeout, pending)
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|err| transport_error(&err))?;

        let (parts, body) = response.into_parts();
        let metadata = ResponseMetadata::from(&parts);
        debug!(status = %metadata.status(), "response head received");

        // Trailer frames carry no body bytes.
        let body: StreamingBody = Box::pin(
            BodyStream::new(body)
                .try_filter_map(|frame| async move { Ok(frame.into_data().ok()) })
                .map_err(|err| Error::connection(err.to_string())),
        );
        Ok(StreamingResponse::new(metadata, body))
    }
}

impl Service<http::Request<Bytes>> for Transport {
    type Response = StreamingResponse;
    type Error = Error;
    type Future = BoxFuture<'static, Result<StreamingResponse>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        self.clone().head(request).boxed()
    }
}

fn transport_error(err: &hyper_util::client::legacy::Error) -> Error {
    if is_tls_failure(err) {
        Error::tls(err.to_string())
    } else {
        Error::connection(err.to_string())
    }
}

/// Whether a rustls error sits anywhere in the source chain.
///
/// `io::Error` reports the source of the error it wraps rather than the
/// wrapped error, so it is unwrapped explicitly.
fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<rustls::Error>() {
            return true;
        }
        if let Some(io) = err.downcast_ref::<std::io::Error>()
            && io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>())
        {
            return true;
        }
        current = err.source();
    }
    false
}

/// Pooled HTTPS client.
///
/// Layers added with [`HyperClient::layer`] see every request and its
/// response head, before any spec reads the body.
///
/// # Example
///
/// ```ignore
/// use decant::{HttpClientExt, HyperClient, as_json};
/// use decant::middleware::LoggingLayer;
///
/// let client = HyperClient::new().layer(LoggingLayer::new());
/// let request = http::Request::get("https://api.example.com/users/42")
///     .body(bytes::Bytes::new())?;
/// let user = client.send(request, &as_json::<User, _>()).await?;
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: BoxedService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// A client with the default [`ClientConfig`] and no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// A client with `config` and no layers.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let service = BoxCloneSyncService::new(Transport::new(config.clone()));
        Self { service, config }
    }

    /// Wrap the current service in `layer`.
    ///
    /// The last layer added sees requests first.
    #[must_use]
    pub fn layer<L>(self, layer: L) -> Self
    where
        L: Layer<BoxedService>,
        L::Service: Service<http::Request<Bytes>, Response = StreamingResponse, Error = Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <L::Service as Service<http::Request<Bytes>>>::Future: Send + 'static,
    {
        Self {
            service: BoxCloneSyncService::new(layer.layer(self.service)),
            config: self.config,
        }
    }

    /// Add a [`LoggingLayer`](crate::middleware::LoggingLayer).
    #[cfg(feature = "middleware-logging")]
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(crate::middleware::LoggingLayer::new())
    }

    /// The transport settings.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for HyperClient {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<StreamingResponse> {
        self.service.clone().oneshot(request).await
    }
}
