//! In-memory body handlers for unit tests.

use bytes::Bytes;

use crate::{BasicSpec, BodyHandler, Error, Result};

/// Stream type of [`StaticBody`]: the body in two-byte chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunks(pub Vec<Bytes>);

/// A fully received body. File leaves are acknowledged, not written.
pub struct StaticBody(Bytes);

impl StaticBody {
    pub fn new(body: &'static str) -> Self {
        Self::from_bytes(body.as_bytes())
    }

    pub fn from_bytes(body: &'static [u8]) -> Self {
        Self(Bytes::from_static(body))
    }
}

impl BodyHandler<Chunks> for StaticBody {
    fn handle_basic<T>(self, basic: BasicSpec<T, Chunks>) -> Result<T> {
        match basic {
            BasicSpec::Ignore(eq) => Ok(eq.cast(())),
            BasicSpec::ByteArray(eq) => Ok(eq.cast(self.0)),
            BasicSpec::Stream(eq) => {
                let chunks = self.0.chunks(2).map(Bytes::copy_from_slice).collect();
                Ok(eq.cast(Chunks(chunks)))
            }
            BasicSpec::File {
                target, witness, ..
            } => Ok(witness.cast(target)),
        }
    }
}

/// A body whose every read fails.
pub struct FailingBody;

impl BodyHandler<Chunks> for FailingBody {
    fn handle_basic<T>(self, _basic: BasicSpec<T, Chunks>) -> Result<T> {
        Err(Error::body("boom"))
    }
}
