//! Type-equality witness.

use std::fmt;

/// Proof that `A` and `B` are the same type.
///
/// The only constructor is [`TypeEq::refl`], which exists for `TypeEq<A, A>`
/// alone, so holding a `TypeEq<A, B>` means `A == B`. Generic code that only
/// knows `A` and `B` separately uses the proof to move values between them.
///
/// [`BasicSpec`](crate::BasicSpec) leaves carry one so that, for example, a
/// stream spec can only be built as `ResponseSpec<S, S>`.
pub struct TypeEq<A, B> {
    cast: fn(A) -> B,
    uncast: fn(B) -> A,
}

impl<A> TypeEq<A, A> {
    /// The reflexive proof `A == A`.
    #[must_use]
    pub fn refl() -> Self {
        Self {
            cast: std::convert::identity,
            uncast: std::convert::identity,
        }
    }
}

impl<A, B> TypeEq<A, B> {
    /// View an `A` as a `B`.
    pub fn cast(self, value: A) -> B {
        (self.cast)(value)
    }

    /// View a `B` as an `A`.
    pub fn uncast(self, value: B) -> A {
        (self.uncast)(value)
    }

    /// The symmetric proof `B == A`.
    #[must_use]
    pub const fn flip(self) -> TypeEq<B, A> {
        TypeEq {
            cast: self.uncast,
            uncast: self.cast,
        }
    }
}

impl<A, B> Clone for TypeEq<A, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, B> Copy for TypeEq<A, B> {}

impl<A, B> fmt::Debug for TypeEq<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TypeEq<{}, {}>",
            std::any::type_name::<A>(),
            std::any::type_name::<B>()
        )
    }
}
