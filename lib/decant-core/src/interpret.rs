//! Spec interpretation.
//!
//! A backend provides two things:
//! - a [`BodyHandler`] that executes [`BasicSpec`] leaves against the body it
//!   received, synchronously;
//! - an [`Effect`] describing how results are wrapped (plain `Result`, boxed
//!   future, single-item stream, ...).
//!
//! [`interpret`] walks the spec, calls the handler at the leaf and lifts the
//! result into the effect. It never panics on leaf failures: they travel in
//! the effect's failure channel.

use tracing::debug;

use crate::spec::{Resolved, Selection, Then};
use crate::{BasicSpec, ResponseMetadata, ResponseSpec, Result, Selected, TypeEq};

/// The effect a backend delivers results in.
///
/// Only two operations are needed: lifting an already computed result, and
/// transforming the eventual value.
pub trait Effect {
    /// Effectful value producing a `T`.
    type Lifted<T: Send + 'static>;

    /// Lift a result: `Ok` becomes a successful effect, `Err` a failed one.
    fn from_result<T: Send + 'static>(&self, result: Result<T>) -> Self::Lifted<T>;

    /// Apply `f` to the value once it is available. Failures pass through.
    fn map<A, B, F>(&self, lifted: Self::Lifted<A>, f: F) -> Self::Lifted<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static;
}

/// The identity effect: results are returned directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

impl Effect for Blocking {
    type Lifted<T: Send + 'static> = Result<T>;

    fn from_result<T: Send + 'static>(&self, result: Result<T>) -> Result<T> {
        result
    }

    fn map<A, B, F>(&self, lifted: Result<A>, f: F) -> Result<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        lifted.map(f)
    }
}

/// Executes basic specs against a received body.
///
/// `S` is the backend stream type. The handler is consumed: a body is read
/// exactly once.
pub trait BodyHandler<S> {
    /// Execute a leaf.
    ///
    /// Implementations must handle every [`BasicSpec`] variant; use the
    /// variant's witness to return the value as a `T`.
    fn handle_basic<T>(self, basic: BasicSpec<T, S>) -> Result<T>;
}

/// Run `spec` against a received response.
///
/// - leaves go through [`BodyHandler::handle_basic`] and are lifted with
///   [`Effect::from_result`];
/// - [`ResponseSpec::FromMetadata`] runs the spec its selector picks;
/// - [`ResponseSpec::Mapped`] runs its leaf, then applies the (already
///   composed) mapping with a single [`Effect::map`].
pub fn interpret<E, H, T, S>(
    effect: &E,
    spec: &ResponseSpec<T, S>,
    handler: H,
    metadata: &ResponseMetadata,
) -> E::Lifted<T>
where
    E: Effect,
    H: BodyHandler<S>,
    T: Send + 'static,
    S: Send + 'static,
{
    interpret_selected(effect, spec.resolve_for(metadata), handler, metadata)
}

/// [`interpret`] for a spec already resolved with
/// [`ResponseSpec::resolve_for`]. No selector runs again.
pub fn interpret_selected<E, H, T, S>(
    effect: &E,
    selected: Selected<T, S>,
    handler: H,
    metadata: &ResponseMetadata,
) -> E::Lifted<T>
where
    E: Effect,
    H: BodyHandler<S>,
    T: Send + 'static,
    S: Send + 'static,
{
    match selected.0 {
        Selection::Basic(basic) => {
            debug!(kind = %basic.kind(), "handling response body");
            effect.from_result(handler.handle_basic(basic))
        }
        Selection::Mapped(resolved) => {
            debug!(kind = %resolved.kind(), "handling mapped response body");
            let metadata = metadata.clone();
            match resolved {
                Resolved::Ignore(then) => {
                    let result = handler.handle_basic(BasicSpec::Ignore(TypeEq::refl()));
                    lift_then(effect, result, then, metadata)
                }
                Resolved::ByteArray(then) => {
                    let result = handler.handle_basic(BasicSpec::ByteArray(TypeEq::refl()));
                    lift_then(effect, result, then, metadata)
                }
                Resolved::Stream(then) => {
                    let result = handler.handle_basic(BasicSpec::Stream(TypeEq::refl()));
                    lift_then(effect, result, then, metadata)
                }
                Resolved::File {
                    target,
                    overwrite,
                    then,
                } => {
                    let result = handler.handle_basic(BasicSpec::File {
                        target,
                        overwrite,
                        witness: TypeEq::refl(),
                    });
                    lift_then(effect, result, then, metadata)
                }
            }
        }
    }
}

fn lift_then<E, L, T>(
    effect: &E,
    result: Result<L>,
    then: Then<L, T>,
    metadata: ResponseMetadata,
) -> E::Lifted<T>
where
    E: Effect,
    L: Send + 'static,
    T: Send + 'static,
{
    effect.map(effect.from_result(result), move |value| then(value, &metadata))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;

    use assert2::{check, let_assert};
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::Error;
    use crate::test_support::{Chunks, FailingBody, StaticBody};

    fn run<T: Send + 'static>(
        spec: &ResponseSpec<T, Chunks>,
        body: &'static str,
        status: StatusCode,
    ) -> Result<T> {
        interpret(
            &Blocking,
            spec,
            StaticBody::new(body),
            &ResponseMetadata::with_status(status),
        )
    }

    /// Counts effect operations, results stay plain.
    #[derive(Default)]
    struct Counting {
        lifts: Cell<usize>,
        maps: Cell<usize>,
    }

    impl Effect for Counting {
        type Lifted<T: Send + 'static> = Result<T>;

        fn from_result<T: Send + 'static>(&self, result: Result<T>) -> Result<T> {
            self.lifts.set(self.lifts.get() + 1);
            result
        }

        fn map<A, B, F>(&self, lifted: Result<A>, f: F) -> Result<B>
        where
            A: Send + 'static,
            B: Send + 'static,
            F: FnOnce(A) -> B + Send + 'static,
        {
            self.maps.set(self.maps.get() + 1);
            lifted.map(f)
        }
    }

    #[test]
    fn basic_leaves() {
        check!(run(&ResponseSpec::ignore(), "body", StatusCode::OK).is_ok());

        let bytes = run(&ResponseSpec::bytes(), "body", StatusCode::OK).expect("bytes");
        check!(bytes == Bytes::from_static(b"body"));

        let stream = run(&ResponseSpec::stream(), "body", StatusCode::OK).expect("stream");
        check!(stream.0 == vec![Bytes::from_static(b"bo"), Bytes::from_static(b"dy")]);

        let path = run(&ResponseSpec::file("out.bin", false), "body", StatusCode::OK).expect("file");
        check!(path == PathBuf::from("out.bin"));
    }

    #[test]
    fn from_metadata_chooses_by_status() {
        let spec = ResponseSpec::<Option<Bytes>, Chunks>::from_metadata(|metadata| {
            if metadata.status() == StatusCode::NOT_FOUND {
                ResponseSpec::ignore().map(|()| None)
            } else {
                ResponseSpec::bytes().map(Some)
            }
        });

        let missing = run(&spec, "gone", StatusCode::NOT_FOUND).expect("404");
        check!(missing.is_none());

        let found = run(&spec, "here", StatusCode::OK).expect("200");
        check!(found == Some(Bytes::from_static(b"here")));
    }

    #[test]
    fn map_composition_law() {
        let f = |bytes: Bytes| bytes.len();
        let g = |len: usize| format!("{len} bytes");

        let chained = ResponseSpec::bytes().map(f).map(g);
        let fused = ResponseSpec::bytes().map(move |bytes| g(f(bytes)));

        let chained = run(&chained, "hello", StatusCode::OK).expect("chained");
        let fused = run(&fused, "hello", StatusCode::OK).expect("fused");
        check!(chained == fused);
        check!(chained == "5 bytes");
    }

    #[test]
    fn mapping_sees_metadata() {
        let spec = ResponseSpec::ignore().map_with_metadata(|(), metadata| metadata.status());
        let status = run(&spec, "", StatusCode::ACCEPTED).expect("status");
        check!(status == StatusCode::ACCEPTED);
    }

    #[test]
    fn chained_maps_apply_one_effect_map() {
        let spec = ResponseSpec::<Bytes, Chunks>::bytes()
            .map(|bytes| bytes.len())
            .map(|len| len * 10)
            .map(|len| len + 1);

        let effect = Counting::default();
        let result = interpret(
            &effect,
            &spec,
            StaticBody::new("abc"),
            &ResponseMetadata::default(),
        );

        check!(result.expect("value") == 31);
        check!(effect.lifts.get() == 1);
        check!(effect.maps.get() == 1);
    }

    #[test]
    fn nested_metadata_branches_resolve() {
        let inner = ResponseSpec::<String, Chunks>::from_metadata(|metadata| {
            let status = metadata.status().as_u16();
            ResponseSpec::bytes().map(move |bytes| format!("{status}:{}", bytes.len()))
        });
        let spec = ResponseSpec::from_metadata(move |_| inner.clone().map(|s| s.to_uppercase()))
            .map(|s: String| s.replace(':', "/"));

        let value = run(&spec, "four", StatusCode::CREATED).expect("value");
        check!(value == "201/4");
    }

    #[test]
    fn leaf_failure_is_lifted_not_mapped() {
        let mapped_calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&mapped_calls);
        let spec = ResponseSpec::<Bytes, Chunks>::bytes().map(move |bytes| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            bytes.len()
        });

        let result = interpret(&Blocking, &spec, FailingBody, &ResponseMetadata::default());
        let_assert!(Err(Error::Body(message)) = result);
        check!(message == "boom");
        check!(mapped_calls.load(std::sync::atomic::Ordering::SeqCst) == 0);

        let result = interpret(
            &Blocking,
            &ResponseSpec::<(), Chunks>::ignore(),
            FailingBody,
            &ResponseMetadata::default(),
        );
        check!(result.is_err());
    }

    #[test]
    fn selected_spec_runs_without_selecting_again() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let spec = ResponseSpec::<Option<Bytes>, Chunks>::from_metadata(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                ResponseSpec::bytes().map(Some)
            } else {
                ResponseSpec::ignore().map(|()| None)
            }
        });
        let metadata = ResponseMetadata::default();

        let selected = spec.resolve_for(&metadata);
        let value = interpret_selected(&Blocking, selected, StaticBody::new("once"), &metadata);
        check!(value.expect("value") == Some(Bytes::from_static(b"once")));
        check!(calls.load(Ordering::SeqCst) == 1);
    }

    #[test]
    fn selected_basic_leaf_is_lifted_without_map() {
        let effect = Counting::default();
        let metadata = ResponseMetadata::default();
        let selected = ResponseSpec::<Bytes, Chunks>::from_metadata(|_| ResponseSpec::bytes())
            .resolve_for(&metadata);

        let result = interpret_selected(&effect, selected, StaticBody::new("ab"), &metadata);
        check!(result.expect("bytes") == Bytes::from_static(b"ab"));
        check!(effect.lifts.get() == 1);
        check!(effect.maps.get() == 0);
    }

    #[test]
    fn spec_is_reusable_across_responses() {
        let spec = ResponseSpec::<Bytes, Chunks>::bytes().map(|bytes| bytes.len());

        check!(run(&spec, "a", StatusCode::OK).expect("first") == 1);
        check!(run(&spec, "abc", StatusCode::OK).expect("second") == 3);
    }
}
