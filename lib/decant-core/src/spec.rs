//! Response specifications.
//!
//! A [`ResponseSpec<T, S>`] describes how a response body becomes a `T`. It is
//! built when the request is built, and executed by a backend through
//! [`interpret`](crate::interpret) once the response arrives. `S` is the
//! backend's streaming body type and only matters for [`ResponseSpec::stream`].
//!
//! # Example
//!
//! ```
//! use decant_core::{NoStreams, ResponseSpec};
//!
//! // Body length on success, nothing otherwise.
//! let spec = ResponseSpec::<_, NoStreams>::from_metadata(|metadata| {
//!     if metadata.is_success() {
//!         ResponseSpec::bytes().map(|bytes| Some(bytes.len()))
//!     } else {
//!         ResponseSpec::ignore().map(|()| None)
//!     }
//! });
//! # let _ = spec;
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::trace;

use crate::{ResponseMetadata, TypeEq};

/// Stream type of backends that cannot stream.
///
/// It has no values, so a stream leaf of a `ResponseSpec<T, NoStreams>` can
/// never be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoStreams {}

// ============================================================================
// Basic Specs
// ============================================================================

/// The basic leaf a spec resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    /// Body is discarded.
    Ignore,
    /// Body is buffered in memory.
    ByteArray,
    /// Body is handed over as the backend stream.
    Stream,
    /// Body is written to a file.
    File,
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::ByteArray => write!(f, "byte array"),
            Self::Stream => write!(f, "stream"),
            Self::File => write!(f, "file"),
        }
    }
}

/// Leaf specs, the only ones a backend executes directly.
///
/// Each variant carries a [`TypeEq`] proving that `T` is the type the leaf
/// naturally produces, so a backend matching on a `BasicSpec<T, S>` can hand
/// back a `T`.
pub enum BasicSpec<T, S> {
    /// Discard the body. Produces `()`.
    Ignore(TypeEq<(), T>),
    /// Buffer the whole body. Produces [`Bytes`].
    ByteArray(TypeEq<Bytes, T>),
    /// Hand over the backend stream. Produces `S`.
    Stream(TypeEq<S, T>),
    /// Write the body to `target`. Produces the target path.
    File {
        /// Where to write the body.
        target: PathBuf,
        /// Replace an existing file instead of failing.
        overwrite: bool,
        /// `PathBuf == T`.
        witness: TypeEq<PathBuf, T>,
    },
}

impl<T, S> BasicSpec<T, S> {
    /// Which leaf this is.
    #[must_use]
    pub const fn kind(&self) -> BasicKind {
        match self {
            Self::Ignore(_) => BasicKind::Ignore,
            Self::ByteArray(_) => BasicKind::ByteArray,
            Self::Stream(_) => BasicKind::Stream,
            Self::File { .. } => BasicKind::File,
        }
    }
}

impl<T, S> Clone for BasicSpec<T, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Ignore(eq) => Self::Ignore(*eq),
            Self::ByteArray(eq) => Self::ByteArray(*eq),
            Self::Stream(eq) => Self::Stream(*eq),
            Self::File {
                target,
                overwrite,
                witness,
            } => Self::File {
                target: target.clone(),
                overwrite: *overwrite,
                witness: *witness,
            },
        }
    }
}

impl<T, S> fmt::Debug for BasicSpec<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore(_) => f.write_str("Ignore"),
            Self::ByteArray(_) => f.write_str("ByteArray"),
            Self::Stream(_) => f.write_str("Stream"),
            Self::File {
                target, overwrite, ..
            } => f
                .debug_struct("File")
                .field("target", target)
                .field("overwrite", overwrite)
                .finish_non_exhaustive(),
        }
    }
}

// ============================================================================
// Response Spec
// ============================================================================

pub(crate) type MetadataFn<A, B> = Arc<dyn Fn(A, &ResponseMetadata) -> B + Send + Sync>;

/// How to turn a response body into a `T`.
///
/// Specs are immutable; every combinator returns a new spec that shares the
/// original. Cloning is cheap, so one spec can serve many requests.
pub enum ResponseSpec<T, S> {
    /// A leaf.
    Basic(BasicSpec<T, S>),
    /// Choose the spec once the response metadata is known.
    FromMetadata(Selector<T, S>),
    /// Post-process the result of another spec.
    Mapped(Mapped<T, S>),
}

impl<S> ResponseSpec<(), S> {
    /// Discard the body.
    #[must_use]
    pub fn ignore() -> Self {
        Self::Basic(BasicSpec::Ignore(TypeEq::refl()))
    }
}

impl<S> ResponseSpec<Bytes, S> {
    /// Buffer the whole body in memory.
    #[must_use]
    pub fn bytes() -> Self {
        Self::Basic(BasicSpec::ByteArray(TypeEq::refl()))
    }
}

impl<S> ResponseSpec<S, S> {
    /// Hand over the backend's body stream as is.
    #[must_use]
    pub fn stream() -> Self {
        Self::Basic(BasicSpec::Stream(TypeEq::refl()))
    }
}

impl<S> ResponseSpec<PathBuf, S> {
    /// Write the body to `target`.
    ///
    /// With `overwrite` unset, an existing target makes the backend fail
    /// with [`Error::FileExists`](crate::Error::FileExists).
    #[must_use]
    pub fn file(target: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self::Basic(BasicSpec::File {
            target: target.into(),
            overwrite,
            witness: TypeEq::refl(),
        })
    }
}

impl<T, S> ResponseSpec<T, S> {
    /// Choose the spec to run from the response metadata.
    ///
    /// [`ResponseSpec::resolve_for`] calls each selector on the execution
    /// path once per response. Other inspections, such as
    /// [`ResponseSpec::depth`], call it again.
    #[must_use]
    pub fn from_metadata<F>(select: F) -> Self
    where
        F: Fn(&ResponseMetadata) -> Self + Send + Sync + 'static,
    {
        Self::FromMetadata(Selector(Arc::new(select)))
    }
}

impl<T: 'static, S: 'static> ResponseSpec<T, S> {
    /// Transform the result.
    #[must_use]
    pub fn map<T2, F>(self, f: F) -> ResponseSpec<T2, S>
    where
        T2: 'static,
        F: Fn(T) -> T2 + Send + Sync + 'static,
    {
        self.map_with_metadata(move |value, _| f(value))
    }

    /// Transform the result, with the response metadata at hand.
    ///
    /// Mapping a mapped spec composes both functions into one [`Mapped`] node
    /// over the original spec instead of nesting nodes.
    #[must_use]
    pub fn map_with_metadata<T2, F>(self, f: F) -> ResponseSpec<T2, S>
    where
        T2: 'static,
        F: Fn(T, &ResponseMetadata) -> T2 + Send + Sync + 'static,
    {
        let source = match self {
            Self::Mapped(mapped) => MapSource::Composed(mapped.node),
            base => MapSource::Base(base),
        };
        ResponseSpec::Mapped(Mapped {
            node: Arc::new(MapStep {
                source,
                f: Arc::new(f),
            }),
        })
    }

    /// Number of spec nodes on the execution path for `metadata`.
    #[must_use]
    pub fn depth(&self, metadata: &ResponseMetadata) -> usize {
        match self {
            Self::Basic(_) => 1,
            Self::FromMetadata(selector) => 1 + selector.select(metadata).depth(metadata),
            Self::Mapped(mapped) => 1 + mapped.node.base_depth(metadata),
        }
    }

    /// The leaf this spec resolves to for `metadata`.
    #[must_use]
    pub fn leaf_kind(&self, metadata: &ResponseMetadata) -> BasicKind {
        self.resolve_for(metadata).kind()
    }

    /// Make every metadata selection on the execution path for `metadata`.
    ///
    /// Backends that must know the leaf before reading the body resolve once,
    /// shape the body after [`Selected::kind`] and hand the same value to
    /// [`interpret_selected`](crate::interpret_selected).
    #[must_use]
    pub fn resolve_for(&self, metadata: &ResponseMetadata) -> Selected<T, S> {
        match self {
            Self::Basic(basic) => Selected(Selection::Basic(basic.clone())),
            Self::FromMetadata(selector) => {
                trace!(status = %metadata.status(), "selecting response spec");
                selector.select(metadata).resolve_for(metadata)
            }
            Self::Mapped(mapped) => Selected(Selection::Mapped(mapped.resolve(metadata))),
        }
    }

    fn resolve(&self, metadata: &ResponseMetadata) -> Resolved<T, S> {
        match self {
            Self::Basic(basic) => Resolved::from_basic(basic.clone()),
            Self::FromMetadata(selector) => {
                trace!(status = %metadata.status(), "selecting mapped response spec");
                selector.select(metadata).resolve(metadata)
            }
            Self::Mapped(mapped) => mapped.resolve(metadata),
        }
    }
}

impl<T, S> Clone for ResponseSpec<T, S> {
    fn clone(&self) -> Self {
        match self {
            Self::Basic(basic) => Self::Basic(basic.clone()),
            Self::FromMetadata(selector) => Self::FromMetadata(selector.clone()),
            Self::Mapped(mapped) => Self::Mapped(mapped.clone()),
        }
    }
}

impl<T, S> fmt::Debug for ResponseSpec<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(basic) => f.debug_tuple("Basic").field(basic).finish(),
            Self::FromMetadata(selector) => selector.fmt(f),
            Self::Mapped(mapped) => mapped.fmt(f),
        }
    }
}

// ============================================================================
// Composite Nodes
// ============================================================================

/// Metadata-dependent choice of spec.
pub struct Selector<T, S>(Arc<dyn Fn(&ResponseMetadata) -> ResponseSpec<T, S> + Send + Sync>);

impl<T, S> Selector<T, S> {
    /// The spec to run for `metadata`.
    #[must_use]
    pub fn select(&self, metadata: &ResponseMetadata) -> ResponseSpec<T, S> {
        (self.0)(metadata)
    }
}

impl<T, S> Clone for Selector<T, S> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T, S> fmt::Debug for Selector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FromMetadata(..)")
    }
}

/// A spec whose result goes through a mapping function.
///
/// The wrapped spec is never itself a [`ResponseSpec::Mapped`]: successive
/// mappings are folded into a single node.
pub struct Mapped<T, S> {
    node: Arc<dyn MapNode<T, S>>,
}

impl<T, S> Mapped<T, S> {
    pub(crate) fn resolve(&self, metadata: &ResponseMetadata) -> Resolved<T, S> {
        self.node.resolve(metadata)
    }
}

impl<T, S> Clone for Mapped<T, S> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T, S> fmt::Debug for Mapped<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapped(..)")
    }
}

trait MapNode<T, S>: Send + Sync {
    fn resolve(&self, metadata: &ResponseMetadata) -> Resolved<T, S>;

    fn base_depth(&self, metadata: &ResponseMetadata) -> usize;
}

enum MapSource<T, S> {
    /// The spec being mapped; never a `Mapped`.
    Base(ResponseSpec<T, S>),
    /// Earlier mapping steps over the same base.
    Composed(Arc<dyn MapNode<T, S>>),
}

struct MapStep<T0, T, S> {
    source: MapSource<T0, S>,
    f: MetadataFn<T0, T>,
}

impl<T0: 'static, T: 'static, S: 'static> MapNode<T, S> for MapStep<T0, T, S> {
    fn resolve(&self, metadata: &ResponseMetadata) -> Resolved<T, S> {
        let resolved = match &self.source {
            MapSource::Base(spec) => spec.resolve(metadata),
            MapSource::Composed(node) => node.resolve(metadata),
        };
        resolved.then(Arc::clone(&self.f))
    }

    fn base_depth(&self, metadata: &ResponseMetadata) -> usize {
        match &self.source {
            MapSource::Base(spec) => spec.depth(metadata),
            MapSource::Composed(node) => node.base_depth(metadata),
        }
    }
}

// ============================================================================
// Resolution
// ============================================================================

pub(crate) type Then<L, T> = Box<dyn FnOnce(L, &ResponseMetadata) -> T + Send>;

/// A spec reduced to its leaf plus everything to apply to the leaf value.
pub(crate) enum Resolved<T, S> {
    Ignore(Then<(), T>),
    ByteArray(Then<Bytes, T>),
    Stream(Then<S, T>),
    File {
        target: PathBuf,
        overwrite: bool,
        then: Then<PathBuf, T>,
    },
}

impl<T: 'static, S: 'static> Resolved<T, S> {
    fn from_basic(basic: BasicSpec<T, S>) -> Self {
        match basic {
            BasicSpec::Ignore(eq) => {
                Self::Ignore(Box::new(move |unit: (), _: &ResponseMetadata| eq.cast(unit)))
            }
            BasicSpec::ByteArray(eq) => {
                Self::ByteArray(Box::new(move |bytes: Bytes, _: &ResponseMetadata| {
                    eq.cast(bytes)
                }))
            }
            BasicSpec::Stream(eq) => {
                Self::Stream(Box::new(move |stream: S, _: &ResponseMetadata| {
                    eq.cast(stream)
                }))
            }
            BasicSpec::File {
                target,
                overwrite,
                witness,
            } => Self::File {
                target,
                overwrite,
                then: Box::new(move |path: PathBuf, _: &ResponseMetadata| witness.cast(path)),
            },
        }
    }

    fn then<T2: 'static>(self, f: MetadataFn<T, T2>) -> Resolved<T2, S> {
        match self {
            Self::Ignore(first) => Resolved::Ignore(compose(first, f)),
            Self::ByteArray(first) => Resolved::ByteArray(compose(first, f)),
            Self::Stream(first) => Resolved::Stream(compose(first, f)),
            Self::File {
                target,
                overwrite,
                then,
            } => Resolved::File {
                target,
                overwrite,
                then: compose(then, f),
            },
        }
    }

    pub(crate) const fn kind(&self) -> BasicKind {
        match self {
            Self::Ignore(_) => BasicKind::Ignore,
            Self::ByteArray(_) => BasicKind::ByteArray,
            Self::Stream(_) => BasicKind::Stream,
            Self::File { .. } => BasicKind::File,
        }
    }
}

/// A spec with its metadata selections made, ready to run against one body.
pub struct Selected<T, S>(pub(crate) Selection<T, S>);

pub(crate) enum Selection<T, S> {
    Basic(BasicSpec<T, S>),
    Mapped(Resolved<T, S>),
}

impl<T: 'static, S: 'static> Selected<T, S> {
    /// The leaf to run.
    #[must_use]
    pub const fn kind(&self) -> BasicKind {
        match &self.0 {
            Selection::Basic(basic) => basic.kind(),
            Selection::Mapped(resolved) => resolved.kind(),
        }
    }
}

impl<T, S> fmt::Debug for Selected<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Selection::Basic(basic) => f.debug_tuple("Selected").field(basic).finish(),
            Selection::Mapped(_) => f.write_str("Selected(Mapped(..))"),
        }
    }
}

fn compose<L: 'static, A: 'static, B: 'static>(first: Then<L, A>, f: MetadataFn<A, B>) -> Then<L, B> {
    Box::new(move |value: L, metadata: &ResponseMetadata| f(first(value, metadata), metadata))
}
