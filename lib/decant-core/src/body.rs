//! Ready-made body specs and decoding utilities.
//!
//! Everything here is built from the public combinators of
//! [`ResponseSpec`]; backends need nothing beyond the basic leaves.

use tracing::warn;

use crate::form::{Charset, decode_form_with};
use crate::{Error, ResponseError, ResponseSpec, Result, deserialize_catching_errors};

/// Decode a text body with the charset named by `Content-Type`.
///
/// Without a charset the body is read as UTF-8. Unknown charsets fall back to
/// UTF-8 as well; invalid sequences become U+FFFD.
#[must_use]
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> String {
    resolve_charset(charset).decode(bytes)
}

fn resolve_charset(label: Option<&str>) -> Charset {
    let Some(label) = label else {
        return Charset::Utf8;
    };
    label.parse().unwrap_or_else(|_| {
        warn!(charset = label, "unsupported charset, decoding as UTF-8");
        Charset::Utf8
    })
}

/// The body as text.
#[must_use]
pub fn as_string<S: 'static>() -> ResponseSpec<String, S> {
    ResponseSpec::bytes().map_with_metadata(|bytes, metadata| decode_text(&bytes, metadata.charset()))
}

/// The body as text: `Ok` for a 2xx response, `Err` otherwise.
#[must_use]
pub fn as_string_or_error<S: 'static>() -> ResponseSpec<std::result::Result<String, String>, S> {
    as_string().map_with_metadata(|text, metadata| {
        if metadata.is_success() {
            Ok(text)
        } else {
            Err(text)
        }
    })
}

/// The body as JSON for a 2xx response.
///
/// Error responses become [`ResponseError::Http`], malformed JSON becomes
/// [`ResponseError::Deserialization`] holding an [`Error::JsonDeserialization`].
#[must_use]
pub fn as_json<T, S>() -> ResponseSpec<std::result::Result<T, ResponseError<Error>>, S>
where
    T: serde::de::DeserializeOwned + 'static,
    S: 'static,
{
    deserialize_catching_errors(as_string_or_error(), |body| from_json(body.as_bytes()))
}

/// The body as form parameters, decoded with the response charset.
#[must_use]
pub fn as_form_params<S: 'static>() -> ResponseSpec<Vec<(String, String)>, S> {
    ResponseSpec::bytes().map_with_metadata(|bytes, metadata| {
        let charset = resolve_charset(metadata.charset());
        decode_form_with(&charset.decode(&bytes), charset)
    })
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` to provide detailed error messages that include
/// the exact path to the field that failed to deserialize.
///
/// # Errors
///
/// Returns an error if JSON deserialization fails, with the error message
/// including the path to the problematic field (e.g., "user.address.city").
///
/// # Example
///
/// ```
/// use decant_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let bytes = br#"{"name":"Alice"}"#;
/// let user: User = from_json(bytes).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}
