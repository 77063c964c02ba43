//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and functions
//! for easy glob importing:
//!
//! ```ignore
//! use decant_core::prelude::*;
//! ```

pub use crate::{
    BasicSpec, Blocking, BodyHandler, Effect, Error, NoStreams, Response, ResponseError,
    ResponseMetadata, ResponseSpec, Result, as_json, as_string, as_string_or_error,
    deserialize_catching_errors, from_json, interpret,
};
