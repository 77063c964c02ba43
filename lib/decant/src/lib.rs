//! Declarative response handling for Rust HTTP clients.
//!
//! Describe what a response body should become with a [`ResponseSpec`], then
//! let a backend run it: the body is ignored, buffered, written to a file or
//! streamed, and the result is mapped into your type.
//!
//! # Example
//!
//! ```ignore
//! use decant::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! let client = HyperClient::new();
//! let request = http::Request::get("https://api.example.com/users/42").body(Bytes::new())?;
//!
//! match client.send(request, &as_json::<User, _>()).await? {
//!     Ok(user) => println!("{user:?}"),
//!     Err(ResponseError::Http(err)) => eprintln!("HTTP {}: {}", err.status, err.body),
//!     Err(ResponseError::Deserialization(err)) => eprintln!("bad body: {}", err.message),
//! }
//! ```
//!
//! Backends:
//! - [`handle_response`] - Buffered response, [`Blocking`] effect
//! - [`HttpClientExt::send`] - Live request, [`Async`] effect
//! - [`StreamOfOne`] - Stream effect for callers that compose streams

mod client;
mod config;
mod connector;
mod effect;
mod handler;
pub mod middleware;
pub mod prelude;

pub use client::{BoxedService, HttpClient, HttpClientExt, HyperClient};
pub use config::ClientConfig;
pub use effect::{Async, StreamOfOne};
pub use handler::{BufferedBody, ReceivedBody, handle_response};

// Re-export http and tower for building requests and middleware
pub use http;
pub use tower;

// Re-export core types
pub use decant_core::{
    BasicKind, BasicSpec, Blocking, BodyHandler, Bytes, Charset, DeserializationError, Effect,
    Error, HeaderMap, HttpError, Mapped, NoStreams, Response, ResponseError, ResponseMetadata,
    ResponseSpec, Result, Selected, Selector, StatusCode, StreamingBody, StreamingResponse,
    TypeEq, as_form_params, as_json, as_string, as_string_or_error, decode_form,
    decode_form_with, decode_text, deserialize_catching_errors, from_json, header, interpret,
    interpret_selected,
};
