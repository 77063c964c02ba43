//! Asynchronous effects.
//!
//! [`Async`] delivers the interpreted value as a boxed future, [`StreamOfOne`]
//! as a stream that yields exactly one item.

use decant_core::{Effect, Error, Result};
use futures_util::future::{self, BoxFuture, FutureExt};
use futures_util::stream::{self, BoxStream, StreamExt};

/// Future-based effect: `Lifted<T>` is a `BoxFuture` resolving to `Result<T>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Async;

impl Effect for Async {
    type Lifted<T: Send + 'static> = BoxFuture<'static, Result<T>>;

    fn from_result<T: Send + 'static>(&self, result: Result<T>) -> Self::Lifted<T> {
        future::ready(result).boxed()
    }

    fn map<A, B, F>(&self, lifted: Self::Lifted<A>, f: F) -> Self::Lifted<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        lifted.map(move |result| result.map(f)).boxed()
    }
}

/// Stream-based effect: `Lifted<T>` yields a single `Result<T>`.
///
/// A mapped stream that ends without an item yields [`Error::EmptyEffect`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamOfOne;

impl Effect for StreamOfOne {
    type Lifted<T: Send + 'static> = BoxStream<'static, Result<T>>;

    fn from_result<T: Send + 'static>(&self, result: Result<T>) -> Self::Lifted<T> {
        stream::once(future::ready(result)).boxed()
    }

    fn map<A, B, F>(&self, lifted: Self::Lifted<A>, f: F) -> Self::Lifted<B>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        let mut lifted = lifted;
        stream::once(async move {
            match lifted.next().await {
                Some(result) => result.map(f),
                None => Err(Error::EmptyEffect),
            }
        })
        .boxed()
    }
}
