//! Received HTTP responses.
//!
//! [`Response`] pairs [`ResponseMetadata`] with a buffered body. With the
//! `streaming` feature, [`streaming::StreamingResponse`] keeps the body as a
//! stream of chunks until a spec decides what to do with it.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::ResponseMetadata;

// ============================================================================
// Streaming Response (feature-gated)
// ============================================================================

/// Streaming response support (requires `streaming` feature).
#[cfg(feature = "streaming")]
pub mod streaming {
    use std::pin::Pin;

    use bytes::Bytes;
    use futures_core::Stream;
    use futures_util::StreamExt;

    use crate::ResponseMetadata;

    /// A streaming body: chunks of bytes arriving over time.
    pub type StreamingBody = Pin<Box<dyn Stream<Item = crate::Result<Bytes>> + Send>>;

    /// HTTP response whose body has not been read yet.
    pub struct StreamingResponse {
        metadata: ResponseMetadata,
        body: StreamingBody,
    }

    impl StreamingResponse {
        /// Creates a new streaming response.
        #[must_use]
        pub fn new(metadata: ResponseMetadata, body: StreamingBody) -> Self {
            Self { metadata, body }
        }

        /// Status and headers.
        #[must_use]
        pub const fn metadata(&self) -> &ResponseMetadata {
            &self.metadata
        }

        /// Consume into (metadata, body).
        #[must_use]
        pub fn into_parts(self) -> (ResponseMetadata, StreamingBody) {
            (self.metadata, self.body)
        }

        /// Buffer the entire stream into a [`Response`](super::Response).
        ///
        /// # Errors
        ///
        /// Returns an error if reading any chunk fails.
        pub async fn collect(self) -> crate::Result<super::Response<Bytes>> {
            let mut body = self.body;
            let mut collected = Vec::new();

            while let Some(chunk) = body.next().await {
                collected.extend_from_slice(&chunk?);
            }

            Ok(super::Response::new(self.metadata, Bytes::from(collected)))
        }
    }

    impl std::fmt::Debug for StreamingResponse {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("StreamingResponse")
                .field("metadata", &self.metadata)
                .finish_non_exhaustive()
        }
    }
}

// ============================================================================
// Buffered Response
// ============================================================================

/// HTTP response with metadata and a body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    metadata: ResponseMetadata,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub const fn new(metadata: ResponseMetadata, body: B) -> Self {
        Self { metadata, body }
    }

    /// Status and headers.
    #[must_use]
    pub const fn metadata(&self) -> &ResponseMetadata {
        &self.metadata
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.metadata.status()
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        self.metadata.headers()
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into (metadata, body).
    #[must_use]
    pub fn into_parts(self) -> (ResponseMetadata, B) {
        (self.metadata, self.body)
    }

    /// Transform the body with a function.
    pub fn map_body<F, B2>(self, f: F) -> Response<B2>
    where
        F: FnOnce(B) -> B2,
    {
        Response {
            metadata: self.metadata,
            body: f(self.body),
        }
    }
}

impl From<http::Response<Bytes>> for Response<Bytes> {
    fn from(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(ResponseMetadata::from(&parts), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_basic() {
        let response = http::Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .body(Bytes::from(r#"{"id":1}"#))
            .expect("response");
        let response = Response::from(response);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.metadata().content_type(), Some("application/json"));
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.body().as_ref(), br#"{"id":1}"#);
    }

    #[test]
    fn response_map_body() {
        let response = Response::new(
            ResponseMetadata::with_status(StatusCode::OK),
            Bytes::from("test"),
        );
        let mapped = response.map_body(|b| b.len());

        assert_eq!(mapped.status(), StatusCode::OK);
        assert_eq!(*mapped.body(), 4);

        let (metadata, body) = mapped.into_parts();
        assert!(metadata.is_success());
        assert_eq!(body, 4);
    }
}
