//! Deserialization of raw bodies into typed values.

use std::fmt::Display;

use crate::{DeserializationError, HttpError, ResponseError, ResponseSpec};

/// Parse the success body of `base` with `deserialize`.
///
/// `base` yields the raw body as `Ok` for a success response and as `Err` for
/// an error response. The resulting spec yields:
/// - `Err(ResponseError::Http(..))` for an error response, without calling
///   the parser;
/// - `Ok(value)` when the parser succeeds;
/// - `Err(ResponseError::Deserialization(..))` when the parser returns an
///   error. The raw body is kept verbatim.
///
/// A panic in the parser is not caught and unwinds through the interpreter.
///
/// # Example
///
/// ```
/// use decant_core::{NoStreams, ResponseSpec, as_string_or_error, deserialize_catching_errors};
///
/// let spec = deserialize_catching_errors(
///     as_string_or_error::<NoStreams>(),
///     |body| body.trim().parse::<u64>(),
/// );
/// # let _ = spec;
/// ```
pub fn deserialize_catching_errors<T, E, S, F>(
    base: ResponseSpec<Result<String, String>, S>,
    deserialize: F,
) -> ResponseSpec<Result<T, ResponseError<E>>, S>
where
    T: 'static,
    E: Display + 'static,
    S: 'static,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
{
    base.map_with_metadata(move |raw, metadata| match raw {
        Err(body) => Err(HttpError::new(body, metadata.status()).into()),
        Ok(body) => match deserialize(&body) {
            Ok(value) => Ok(value),
            Err(error) => Err(DeserializationError::new(body, error).into()),
        },
    })
}
