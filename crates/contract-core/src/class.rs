//! Class contracts - per-type invariants and their composition
//!
//! A type "has a class contract" exactly when it implements
//! [`ClassContract`]. There is no registration and no common base: the
//! `contract!` macro looks at the concrete type of the guarded object and
//! binds the invariant if the impl exists, at compile time.
//!
//! # Hierarchies
//!
//! Rust has no inheritance; a "derived" type embeds its bases as fields.
//! [`class_contract!`](crate::class_contract) takes the list of base fields
//! and, for each one in order, runs that base's invariant if its type has
//! one, then runs the type's own body. Because each base's
//! `check_invariant` is itself composed, grand-bases are covered without
//! any explicit recursion.
//!
//! # Detection
//!
//! Detection uses autoref method resolution on [`Probe`]: the impl for
//! `&Probe<T>` only exists when `T: ClassContract`, and method lookup tries
//! it before falling back to the impl for `Probe<T>`. This needs a concrete
//! type. Inside generic code `T` is opaque and the probe always reports
//! "no contract"; build the binding with [`ClassBinding::bound`] there.

use std::fmt;
use std::marker::PhantomData;

use crate::CheckContext;

/// The class-level invariant capability.
///
/// `check_invariant` runs the invariant checks of the type, including those
/// of its bases. It receives an invariant-only context; write the body with
/// [`invariant!`](crate::invariant).
pub trait ClassContract {
    fn check_invariant(&self, ctx: &CheckContext);
}

// ── Binding ───────────────────────────────────────────────

/// The class invariant of `T`, if it has one, as a plain function pointer.
pub struct ClassBinding<T: ?Sized> {
    enforce: Option<fn(&T, &CheckContext)>,
}

impl<T: ?Sized> ClassBinding<T> {
    /// No class contract: guards behave like free-function guards.
    pub const fn unbound() -> Self {
        Self { enforce: None }
    }

    pub fn is_bound(&self) -> bool {
        self.enforce.is_some()
    }

    /// Run the bound invariant against `obj`; no-op when unbound.
    pub fn enforce(&self, obj: &T, ctx: &CheckContext) {
        if let Some(enforce) = self.enforce {
            enforce(obj, ctx);
        }
    }
}

impl<T: ClassContract + ?Sized> ClassBinding<T> {
    pub fn bound() -> Self {
        Self {
            enforce: Some(<T as ClassContract>::check_invariant),
        }
    }
}

impl<T: ?Sized> Clone for ClassBinding<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ClassBinding<T> {}

impl<T: ?Sized> fmt::Debug for ClassBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ClassBinding")
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ── Detection ─────────────────────────────────────────────

/// Zero-sized stand-in for a `T` used to pick a [`ClassBinding`].
#[doc(hidden)]
pub struct Probe<T: ?Sized>(PhantomData<fn(&T)>);

impl<T: ?Sized> Probe<T> {
    pub fn new() -> Self {
        Probe(PhantomData)
    }

    /// Infers `T` from an existing value; the borrow ends immediately.
    pub fn of(_: &T) -> Self {
        Probe(PhantomData)
    }
}

impl<T: ?Sized> Default for Probe<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Picked when `T: ClassContract` (receiver `&&Probe<T>`).
#[doc(hidden)]
pub trait BoundProbe<T: ?Sized> {
    fn class_binding(&self) -> ClassBinding<T>;
}

impl<T: ClassContract + ?Sized> BoundProbe<T> for &Probe<T> {
    fn class_binding(&self) -> ClassBinding<T> {
        ClassBinding::bound()
    }
}

/// Fallback after one auto-deref (receiver `&Probe<T>`).
#[doc(hidden)]
pub trait UnboundProbe<T: ?Sized> {
    fn class_binding(&self) -> ClassBinding<T>;
}

impl<T: ?Sized> UnboundProbe<T> for Probe<T> {
    fn class_binding(&self) -> ClassBinding<T> {
        ClassBinding::unbound()
    }
}
