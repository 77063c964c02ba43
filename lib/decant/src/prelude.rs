//! Prelude module for convenient imports.
//!
//! ```ignore
//! use decant::prelude::*;
//! ```

pub use crate::{
    Bytes, Error, HttpClient, HttpClientExt, HyperClient, ResponseError, ResponseMetadata,
    ResponseSpec, Result, StatusCode, StreamingBody, as_form_params, as_json, as_string,
    as_string_or_error, deserialize_catching_errors, handle_response, header,
};
pub use serde::Deserialize;
