//! Core types and traits for the decant HTTP client.
//!
//! A [`ResponseSpec`] declares how a response body becomes a typed value; a
//! backend executes it with [`interpret`]. This crate provides:
//! - [`ResponseSpec`], [`BasicSpec`], [`Selector`], [`Mapped`] - The specification tree
//! - [`TypeEq`] - Type-equality witness carried by the basic leaves
//! - [`ResponseMetadata`] - Status and headers, visible to specs
//! - [`Effect`], [`Blocking`], [`BodyHandler`], [`interpret`] - The interpretation protocol
//! - [`Selected`], [`interpret_selected`] - Interpretation after a single metadata resolution
//! - [`deserialize_catching_errors`] - Typed parsing with [`ResponseError`] results
//! - [`as_string`], [`as_string_or_error`], [`as_json`], [`as_form_params`] - Ready-made specs
//! - [`decode_form`] - `application/x-www-form-urlencoded` decoding
//! - [`Response`] - Buffered received response
//! - [`Error`] and [`Result`] - Error handling
//! - [`StatusCode`], [`HeaderMap`] and [`header`] - Re-exported from the `http` crate

mod body;
mod deserialize;
mod error;
mod form;
mod interpret;
mod metadata;
pub mod prelude;
mod response;
mod spec;
#[cfg(test)]
mod test_support;
mod witness;

pub use body::{as_form_params, as_json, as_string, as_string_or_error, decode_text, from_json};
pub use deserialize::deserialize_catching_errors;
pub use error::{DeserializationError, Error, HttpError, ResponseError, Result};
pub use form::{Charset, decode_form, decode_form_with};
pub use interpret::{Blocking, BodyHandler, Effect, interpret, interpret_selected};
pub use metadata::ResponseMetadata;
pub use response::Response;
pub use spec::{BasicKind, BasicSpec, Mapped, NoStreams, ResponseSpec, Selected, Selector};
pub use witness::TypeEq;

// Re-export http crate types for status codes and headers
pub use bytes::Bytes;
pub use http::{HeaderMap, StatusCode, header};

#[cfg(feature = "streaming")]
pub use response::streaming::{StreamingBody, StreamingResponse};
