//! Body handlers: run a basic leaf against a received body.
//!
//! - [`BufferedBody`] serves buffered responses and cannot stream.
//! - [`ReceivedBody`] is what the async client hands to the interpreter. It
//!   is shaped by [`ReceivedBody::receive`] after the spec has been resolved
//!   against the response head.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use bytes::Bytes;
use decant_core::{
    BasicKind, BasicSpec, Blocking, BodyHandler, Error, NoStreams, Response, ResponseMetadata,
    ResponseSpec, Result, StreamingBody, StreamingResponse, interpret,
};
use tracing::{debug, trace, warn};

// ============================================================================
// Buffered
// ============================================================================

/// A fully buffered body.
#[derive(Debug, Clone)]
pub struct BufferedBody(Bytes);

impl BufferedBody {
    /// Wrap the body bytes.
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self(body.into())
    }
}

impl BodyHandler<NoStreams> for BufferedBody {
    fn handle_basic<T>(self, basic: BasicSpec<T, NoStreams>) -> Result<T> {
        match basic {
            BasicSpec::Ignore(eq) => Ok(eq.cast(())),
            BasicSpec::ByteArray(eq) => Ok(eq.cast(self.0)),
            BasicSpec::Stream(_) => Err(Error::StreamingUnsupported),
            BasicSpec::File {
                target,
                overwrite,
                witness,
            } => {
                write_file(&target, overwrite, &self.0)?;
                Ok(witness.cast(target))
            }
        }
    }
}

/// Interpret a spec against a buffered response.
///
/// # Errors
///
/// Returns an error if the leaf fails: a stream leaf, or a file that cannot
/// be written.
pub fn handle_response<T: Send + 'static>(
    response: Response<Bytes>,
    spec: &ResponseSpec<T, NoStreams>,
) -> Result<T> {
    let (metadata, body) = response.into_parts();
    interpret(&Blocking, spec, BufferedBody(body), &metadata)
}

// ============================================================================
// Received (streaming capable)
// ============================================================================

/// A body read from the wire, in the shape the selected leaf needs.
pub enum ReceivedBody {
    /// The body was dropped unread.
    Discarded,
    /// The body was collected into memory.
    Buffered(Bytes),
    /// The body is left as a stream for the caller.
    Streaming(StreamingBody),
}

impl ReceivedBody {
    /// Read as much of the response as a `kind` leaf needs.
    ///
    /// An ignored body is never read and a streamed body is never buffered.
    /// `kind` comes from [`Selected::kind`](decant_core::Selected::kind) for
    /// this response.
    ///
    /// # Errors
    ///
    /// Returns an error if collecting the body fails.
    pub async fn receive(
        response: StreamingResponse,
        kind: BasicKind,
    ) -> Result<(ResponseMetadata, Self)> {
        trace!(%kind, status = %response.metadata().status(), "receiving body");

        let received = match kind {
            BasicKind::Ignore => {
                let (metadata, _body) = response.into_parts();
                (metadata, Self::Discarded)
            }
            BasicKind::Stream => {
                let (metadata, body) = response.into_parts();
                (metadata, Self::Streaming(body))
            }
            BasicKind::ByteArray | BasicKind::File => {
                let (metadata, bytes) = response.collect().await?.into_parts();
                debug!(bytes = bytes.len(), "body collected");
                (metadata, Self::Buffered(bytes))
            }
        };
        Ok(received)
    }

    fn into_bytes(self, expected: BasicKind) -> Result<Bytes> {
        match self {
            Self::Buffered(bytes) => Ok(bytes),
            Self::Discarded | Self::Streaming(_) => Err(Error::UnexpectedBody { expected }),
        }
    }
}

impl BodyHandler<StreamingBody> for ReceivedBody {
    fn handle_basic<T>(self, basic: BasicSpec<T, StreamingBody>) -> Result<T> {
        match basic {
            BasicSpec::Ignore(eq) => Ok(eq.cast(())),
            BasicSpec::ByteArray(eq) => self.into_bytes(BasicKind::ByteArray).map(|b| eq.cast(b)),
            BasicSpec::Stream(eq) => match self {
                Self::Streaming(body) => Ok(eq.cast(body)),
                Self::Discarded | Self::Buffered(_) => Err(Error::UnexpectedBody {
                    expected: BasicKind::Stream,
                }),
            },
            BasicSpec::File {
                target,
                overwrite,
                witness,
            } => {
                let bytes = self.into_bytes(BasicKind::File)?;
                write_file(&target, overwrite, &bytes)?;
                Ok(witness.cast(target))
            }
        }
    }
}

impl std::fmt::Debug for ReceivedBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discarded => f.write_str("Discarded"),
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

// ============================================================================
// File target
// ============================================================================

/// Write the body to `target`. The file is closed before returning.
fn write_file(target: &Path, overwrite: bool, body: &[u8]) -> Result<()> {
    write_with(target, overwrite, |file| file.write_all(body))?;
    debug!(path = %target.display(), bytes = body.len(), overwrite, "body written to file");
    Ok(())
}

/// Open `target` and run `write` on it.
///
/// A file created here is removed again when `write` fails.
fn write_with<F>(target: &Path, overwrite: bool, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    let mut file = options.open(target).map_err(|err| {
        if err.kind() == io::ErrorKind::AlreadyExists {
            Error::file_exists(target)
        } else {
            Error::Io(err)
        }
    })?;

    if let Err(err) = write(&mut file) {
        drop(file);
        if !overwrite && let Err(cleanup) = fs::remove_file(target) {
            warn!(path = %target.display(), error = %cleanup, "partial file left behind");
        }
        return Err(Error::Io(err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use assert2::{check, let_assert};
    use decant_core::StatusCode;
    use futures_util::{StreamExt, stream};

    use super::*;

    fn ok() -> ResponseMetadata {
        ResponseMetadata::with_status(StatusCode::OK)
    }

    fn streaming(chunks: &[&'static str]) -> StreamingResponse {
        let chunks: Vec<Result<Bytes>> = chunks.iter().map(|c| Ok(Bytes::from(*c))).collect();
        StreamingResponse::new(ok(), Box::pin(stream::iter(chunks)))
    }

    #[test]
    fn buffered_bytes_and_ignore() {
        let bytes = handle_response(
            Response::new(ok(), Bytes::from("payload")),
            &ResponseSpec::bytes(),
        );
        let_assert!(Ok(bytes) = bytes);
        check!(bytes.as_ref() == b"payload");

        let unit = handle_response(Response::new(ok(), Bytes::from("x")), &ResponseSpec::ignore());
        check!(unit.is_ok());
    }

    #[test]
    fn buffered_cannot_stream() {
        let spec = ResponseSpec::<NoStreams, NoStreams>::stream();
        let result = handle_response(Response::new(ok(), Bytes::new()), &spec);
        let_assert!(Err(Error::StreamingUnsupported) = result);
    }

    #[test]
    fn file_is_created() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out.bin");

        let spec = ResponseSpec::file(&target, false);
        let result = handle_response(Response::new(ok(), Bytes::from("content")), &spec);
        let_assert!(Ok(path) = result);
        check!(path == target);
        check!(std::fs::read_to_string(&target).expect("read") == "content");
    }

    #[test]
    fn file_without_overwrite_keeps_existing_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("existing.txt");
        std::fs::write(&target, "original").expect("seed");

        let spec = ResponseSpec::file(&target, false);
        let result = handle_response(Response::new(ok(), Bytes::from("new")), &spec);
        let_assert!(Err(Error::FileExists { path }) = result);
        check!(path == target);
        check!(std::fs::read_to_string(&target).expect("read") == "original");
    }

    #[test]
    fn file_with_overwrite_replaces_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("existing.txt");
        std::fs::write(&target, "a much longer original").expect("seed");

        let spec = ResponseSpec::file(&target, true).map(|path: PathBuf| path.exists());
        let result = handle_response(Response::new(ok(), Bytes::from("short")), &spec);
        check!(result.ok() == Some(true));
        check!(std::fs::read_to_string(&target).expect("read") == "short");
    }

    #[test]
    fn failed_write_removes_created_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("partial.bin");

        let result = write_with(&target, false, |file| {
            file.write_all(b"half")?;
            Err(io::Error::other("disk full"))
        });
        let_assert!(Err(Error::Io(err)) = result);
        check!(err.to_string() == "disk full");
        check!(!target.exists());
    }

    #[test]
    fn failed_overwrite_keeps_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("existing.bin");
        std::fs::write(&target, "original").expect("seed");

        let result = write_with(&target, true, |_| Err(io::Error::other("disk full")));
        let_assert!(Err(Error::Io(_)) = result);
        check!(target.exists());
    }

    #[test]
    fn file_in_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("missing").join("out.bin");

        let result = handle_response(
            Response::new(ok(), Bytes::from("x")),
            &ResponseSpec::file(target, true),
        );
        let_assert!(Err(Error::Io(_)) = result);
    }

    #[tokio::test]
    async fn receive_collects_for_bytes() {
        let spec = ResponseSpec::bytes();
        let (metadata, body) = ReceivedBody::receive(streaming(&["ab", "cd"]), BasicKind::ByteArray)
            .await
            .expect("receive");
        let_assert!(ReceivedBody::Buffered(bytes) = &body);
        check!(bytes.as_ref() == b"abcd");

        let result = interpret(&Blocking, &spec, body, &metadata);
        check!(result.ok() == Some(Bytes::from("abcd")));
    }

    #[tokio::test]
    async fn receive_discards_for_ignore() {
        let (_, body) = ReceivedBody::receive(streaming(&["unread"]), BasicKind::Ignore)
            .await
            .expect("receive");
        let_assert!(ReceivedBody::Discarded = body);
    }

    #[tokio::test]
    async fn receive_keeps_stream() {
        let spec = ResponseSpec::<StreamingBody, StreamingBody>::stream();
        let (metadata, body) = ReceivedBody::receive(streaming(&["ab", "cd"]), BasicKind::Stream)
            .await
            .expect("receive");

        let_assert!(Ok(chunks) = interpret(&Blocking, &spec, body, &metadata));
        let chunks: Vec<Bytes> = chunks.map(|chunk| chunk.expect("chunk")).collect().await;
        check!(chunks == vec![Bytes::from("ab"), Bytes::from("cd")]);
    }

    #[test]
    fn mismatched_body_is_rejected() {
        let result = ReceivedBody::Discarded.handle_basic(BasicSpec::<Bytes, StreamingBody>::ByteArray(
            decant_core::TypeEq::refl(),
        ));
        let_assert!(Err(Error::UnexpectedBody { expected }) = result);
        check!(expected == BasicKind::ByteArray);
    }
}
