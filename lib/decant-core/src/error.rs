//! Error types for decant.
//!
//! Two families live here:
//! - [`Error`] is the failure channel of leaf execution and transport. It ends
//!   up inside the backend effect (a failed `Result`, a failed future, ...).
//! - [`ResponseError`] is structured data produced by
//!   [`deserialize_catching_errors`](crate::deserialize_catching_errors): the
//!   response was received fine, but it is an error response or its body
//!   could not be parsed.

use std::path::PathBuf;

use derive_more::{Display, Error, From};
use http::StatusCode;

use crate::BasicKind;

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for decant operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// I/O error while consuming a body (usually while writing a file).
    #[display("I/O error: {_0}")]
    #[from]
    Io(std::io::Error),

    /// The file target already exists and overwriting was not allowed.
    #[display("file already exists: {}", path.display())]
    #[from(skip)]
    FileExists {
        /// The existing file.
        #[error(not(source))]
        path: PathBuf,
    },

    /// The backend has no streaming representation.
    #[display("streaming is not supported by this backend")]
    #[from(skip)]
    StreamingUnsupported,

    /// The body was received in a shape that cannot serve the requested leaf.
    #[display("response body cannot be handled as {expected}")]
    #[from(skip)]
    UnexpectedBody {
        /// The leaf that was requested.
        #[error(not(source))]
        expected: BasicKind,
    },

    /// Reading the body failed.
    #[display("body error: {_0}")]
    #[from(skip)]
    Body(#[error(not(source))] String),

    /// Unknown character encoding label.
    #[display("unsupported charset: {_0}")]
    #[from(skip)]
    UnsupportedCharset(#[error(not(source))] String),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// A stream-based effect completed without producing its value.
    #[display("effect completed without a value")]
    #[from(skip)]
    EmptyEffect,
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a file-exists error.
    #[must_use]
    pub fn file_exists(path: impl Into<PathBuf>) -> Self {
        Self::FileExists { path: path.into() }
    }

    /// Create a body error.
    #[must_use]
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body(message.into())
    }

    /// Create an unsupported charset error.
    #[must_use]
    pub fn unsupported_charset(label: impl Into<String>) -> Self {
        Self::UnsupportedCharset(label.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if a file target already existed.
    #[must_use]
    pub const fn is_file_exists(&self) -> bool {
        matches!(self, Self::FileExists { .. })
    }
}

// ============================================================================
// Response Errors
// ============================================================================

/// The response itself signaled failure; its body was not parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
#[display("HTTP error {status}: {body}")]
pub struct HttpError {
    /// Raw response body.
    #[error(not(source))]
    pub body: String,
    /// Response status code.
    #[error(not(source))]
    pub status: StatusCode,
}

impl HttpError {
    /// Create an HTTP error from a raw body and the response status.
    #[must_use]
    pub fn new(body: impl Into<String>, status: StatusCode) -> Self {
        Self {
            body: body.into(),
            status,
        }
    }
}

/// A successful body could not be parsed.
///
/// Only failures the parser reports through its `Err` value end up here. A
/// panicking parser is not caught.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("failed to deserialize response body: {message}")]
pub struct DeserializationError<E> {
    /// The raw body, verbatim.
    pub body: String,
    /// The parser error.
    pub error: E,
    /// Human readable description of `error`.
    pub message: String,
}

impl<E: std::fmt::Display> DeserializationError<E> {
    /// Capture a parser error together with the body it failed on.
    #[must_use]
    pub fn new(body: impl Into<String>, error: E) -> Self {
        let message = error.to_string();
        Self {
            body: body.into(),
            error,
            message,
        }
    }
}

impl<E> std::error::Error for DeserializationError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Error side of a deserialized response.
#[derive(Debug, Clone, PartialEq, Eq, Display, From)]
pub enum ResponseError<E> {
    /// Error response, see [`HttpError`].
    #[display("{_0}")]
    Http(HttpError),
    /// Unparseable success response, see [`DeserializationError`].
    #[display("{_0}")]
    Deserialization(DeserializationError<E>),
}

impl<E> ResponseError<E> {
    /// Raw body the error was built from.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Http(err) => &err.body,
            Self::Deserialization(err) => &err.body,
        }
    }

    /// Status code, if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http(err) => Some(err.status),
            Self::Deserialization(_) => None,
        }
    }

    /// Returns `true` if the response signaled an error.
    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl<E> std::error::Error for ResponseError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(err) => Some(err),
            Self::Deserialization(err) => Some(err),
        }
    }
}
