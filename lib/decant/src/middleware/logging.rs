//! Request logging.
//!
//! Each request runs in an `http_request` span. The response head is logged
//! when it arrives, with its status, content type and declared length. A
//! body that is read to its end logs how many bytes it delivered; a body the
//! spec discards logs nothing more.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use bytes::Bytes;
use decant_core::{ResponseMetadata, StreamingBody, StreamingResponse};
use futures_util::future::{self, BoxFuture, FutureExt};
use futures_util::stream::{self, StreamExt};
use tower::{Layer, Service};
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::{Error, Result};

/// Layer that adds [`Logging`].
///
/// ```ignore
/// use decant::HyperClient;
/// use decant::middleware::LoggingLayer;
///
/// let client = HyperClient::new().layer(LoggingLayer::new());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer;

impl LoggingLayer {
    /// Create the layer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging { inner }
    }
}

/// Service that logs requests, response heads and delivered body sizes.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
}

impl<S> Service<http::Request<Bytes>> for Logging<S>
where
    S: Service<http::Request<Bytes>, Response = StreamingResponse, Error = Error>,
    S::Future: Send + 'static,
{
    type Response = StreamingResponse;
    type Error = Error;
    type Future = BoxFuture<'static, Result<StreamingResponse>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: http::Request<Bytes>) -> Self::Future {
        let span = info_span!("http_request", method = %request.method(), uri = %request.uri());
        debug!(parent: &span, headers = ?request.headers(), "sending request");

        let started = Instant::now();
        let pending = self.inner.call(request);
        async move {
            let response = match pending.await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, elapsed_ms = millis(started.elapsed()), "request failed");
                    return Err(err);
                }
            };
            log_head(response.metadata(), started.elapsed());

            let (metadata, body) = response.into_parts();
            Ok(StreamingResponse::new(metadata, count_body(body, Span::current())))
        }
        .instrument(span)
        .boxed()
    }
}

fn log_head(metadata: &ResponseMetadata, elapsed: Duration) {
    let status = metadata.status().as_u16();
    let content_type = metadata.content_type().unwrap_or("-");
    let elapsed_ms = millis(elapsed);
    if metadata.is_client_error() || metadata.is_server_error() {
        warn!(status, content_type, elapsed_ms, "error response");
    } else {
        info!(
            status,
            content_type,
            content_length = ?metadata.content_length(),
            elapsed_ms,
            "response head"
        );
    }
}

/// Pass `body` through, logging its size once it ends.
fn count_body(body: StreamingBody, span: Span) -> StreamingBody {
    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    let counted = body.inspect(move |chunk| {
        if let Ok(bytes) = chunk {
            counter.fetch_add(bytes.len(), Ordering::Relaxed);
        }
    });

    let finished = stream::once(
        async move {
            debug!(bytes = received.load(Ordering::Relaxed), "response body finished");
            None::<Result<Bytes>>
        }
        .instrument(span),
    )
    .filter_map(future::ready);

    Box::pin(counted.chain(finished))
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
