//! Response metadata: status and headers, readable before the body.

use http::{HeaderMap, StatusCode, header};

/// Read-only status and headers of a received response.
///
/// Available to [`ResponseSpec::from_metadata`](crate::ResponseSpec::from_metadata)
/// selectors and [`ResponseSpec::map_with_metadata`](crate::ResponseSpec::map_with_metadata)
/// mappers. Header names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    status: StatusCode,
    headers: HeaderMap,
}

impl ResponseMetadata {
    /// Creates metadata from a status code and headers.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap) -> Self {
        Self { status, headers }
    }

    /// Metadata with the given status and no headers.
    #[must_use]
    pub fn with_status(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new())
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Single header value by name, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    /// The `charset` parameter of the `Content-Type` header, unquoted.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.content_type()?
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, value)| value.trim().trim_matches('"'))
    }

    /// The `Content-Length` header, parsed.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.header(header::CONTENT_LENGTH.as_str())?.parse().ok()
    }

    /// Status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status is 3xx.
    #[must_use]
    pub fn is_redirection(&self) -> bool {
        self.status.is_redirection()
    }

    /// Status is 4xx.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// Status is 5xx.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

impl From<&http::response::Parts> for ResponseMetadata {
    fn from(parts: &http::response::Parts) -> Self {
        Self::new(parts.status, parts.headers.clone())
    }
}
