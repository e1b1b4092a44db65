//! Scope guards - run a contract block on entry and again on exit
//!
//! A guard evaluates its block once when it is created (entry phase) and
//! once more when it is dropped (exit phase). Every evaluation runs the
//! whole block; the [`CheckContext`] passed in decides which kinds of
//! checks compare anything in that phase.
//!
//! | scope               | entry                              | exit                                 |
//! |---------------------|------------------------------------|--------------------------------------|
//! | free function       | pre, inv                           | post, inv                            |
//! | method (class)      | class inv, then pre, inv           | post, inv, then class inv            |
//! | constructor (class) | pre                                | post, inv, then class inv (`finish`) |
//! | destructor (class)  | class inv, then pre, inv           | post                                 |
//! | loop                | inv, once per evaluation           | none                                 |
//!
//! A method, constructor or destructor on a type without a class contract
//! behaves exactly like a free function.
//!
//! # Unwinding
//!
//! The exit phase is skipped when the guard is dropped by a panic, so the
//! original panic is what the caller sees. Entry checks always run, including
//! those of a destructor guard for an object dropped by unwinding; a failure
//! there is a double fault and aborts the process. A failing exit check on
//! the normal path may panic out of `drop` (with the raising handler); that
//! panic propagates like any other.

use std::ops::{Deref, DerefMut};
use std::thread;

use crate::{CheckContext, ClassBinding};

/// Where a guard is used. Tags the tracing output of skipped exit phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Function,
    Method,
    Constructor,
    Destructor,
}

fn skip_while_unwinding(scope: ScopeKind, phase: &'static str) -> bool {
    if thread::panicking() {
        tracing::trace!(?scope, phase, "skipping contract checks while unwinding");
        true
    } else {
        false
    }
}

// ── Free functions ────────────────────────────────────────

/// Contract guard for a free function.
///
/// The block usually borrows the function's arguments:
///
/// ```
/// use contract_core::{contract, precondition, postcondition};
///
/// fn isqrt(n: u64) -> u64 {
///     let result = std::cell::Cell::new(0);
///     let _contract = contract!(fun, |ctx| {
///         precondition!(ctx, n < 1 << 52);
///         postcondition!(ctx, result.get() * result.get() <= n);
///     });
///     result.set((n as f64).sqrt() as u64);
///     result.get()
/// }
/// # assert_eq!(isqrt(17), 4);
/// ```
#[must_use = "exit checks run when the guard is dropped; bind it to a named variable"]
pub struct FunctionGuard<F>
where
    F: FnMut(&CheckContext),
{
    checks: F,
    exit_invariant: bool,
}

impl<F> FunctionGuard<F>
where
    F: FnMut(&CheckContext),
{
    /// Run the entry phase with invariants enabled on entry and exit.
    pub fn new(checks: F) -> Self {
        Self::with_phases(checks, true, true)
    }

    /// Run the entry phase; `enter`/`exit` choose whether invariants are checked in each phase.
    pub fn with_phases(mut checks: F, enter: bool, exit: bool) -> Self {
        checks(&CheckContext::entry(enter));
        Self {
            checks,
            exit_invariant: exit,
        }
    }
}

impl<F> Drop for FunctionGuard<F>
where
    F: FnMut(&CheckContext),
{
    fn drop(&mut self) {
        if skip_while_unwinding(ScopeKind::Function, "exit") {
            return;
        }
        (self.checks)(&CheckContext::exit(self.exit_invariant));
    }
}

// ── Methods and destructors ───────────────────────────────

/// Contract guard for a method or destructor.
///
/// Holds the subject (`&T` or `&mut T`) for the whole scope and derefs to
/// it, so the body keeps using the object through the guard while the
/// block gets a shared view at each phase.
#[must_use = "exit checks run when the guard is dropped; bind it to a named variable"]
pub struct MethodGuard<P, F>
where
    P: Deref,
    F: FnMut(&P::Target, &CheckContext),
{
    subject: P,
    checks: F,
    class: ClassBinding<P::Target>,
    exit_invariant: bool,
    scope: ScopeKind,
}

impl<P, F> MethodGuard<P, F>
where
    P: Deref,
    F: FnMut(&P::Target, &CheckContext),
{
    /// Ordinary method: invariants on entry and exit.
    pub fn method(subject: P, class: ClassBinding<P::Target>, checks: F) -> Self {
        Self::with_phases(ScopeKind::Method, subject, class, checks, true, true)
    }

    /// Destructor body: class invariant on entry only.
    ///
    /// Entry checks run even when the object is dropped during unwinding.
    pub fn destructor(subject: P, class: ClassBinding<P::Target>, checks: F) -> Self {
        Self::with_phases(ScopeKind::Destructor, subject, class, checks, true, false)
    }

    /// `enter`/`exit` are ignored for an unbound class, which always gets
    /// free-function behaviour.
    fn with_phases(
        scope: ScopeKind,
        subject: P,
        class: ClassBinding<P::Target>,
        mut checks: F,
        enter: bool,
        exit: bool,
    ) -> Self {
        let (enter, exit) = if class.is_bound() {
            (enter, exit)
        } else {
            (true, true)
        };

        let target = &*subject;
        if enter {
            class.enforce(target, &CheckContext::invariant_only());
        }
        checks(target, &CheckContext::entry(enter));

        Self {
            subject,
            checks,
            class,
            exit_invariant: exit,
            scope,
        }
    }
}

impl<P, F> Deref for MethodGuard<P, F>
where
    P: Deref,
    F: FnMut(&P::Target, &CheckContext),
{
    type Target = P::Target;

    fn deref(&self) -> &P::Target {
        &self.subject
    }
}

impl<P, F> DerefMut for MethodGuard<P, F>
where
    P: DerefMut,
    F: FnMut(&P::Target, &CheckContext),
{
    fn deref_mut(&mut self) -> &mut P::Target {
        &mut self.subject
    }
}

impl<P, F> Drop for MethodGuard<P, F>
where
    P: Deref,
    F: FnMut(&P::Target, &CheckContext),
{
    fn drop(&mut self) {
        if skip_while_unwinding(self.scope, "exit") {
            return;
        }
        let target = &*self.subject;
        (self.checks)(target, &CheckContext::exit(self.exit_invariant));
        if self.exit_invariant {
            self.class.enforce(target, &CheckContext::invariant_only());
        }
    }
}

// ── Constructors ──────────────────────────────────────────

/// Contract guard for a constructor.
///
/// The object does not exist on entry, so the block sees `None` then. The
/// exit phase runs in [`ConstructorGuard::finish`] with `Some(&value)`,
/// followed by the class invariant. A constructor that panics or returns
/// early never reaches `finish`, and the new object is never checked.
#[must_use = "call `finish` with the constructed value to run the exit checks"]
pub struct ConstructorGuard<T, F>
where
    F: FnMut(Option<&T>, &CheckContext),
{
    checks: F,
    class: ClassBinding<T>,
    exit_invariant: bool,
}

impl<T, F> ConstructorGuard<T, F>
where
    F: FnMut(Option<&T>, &CheckContext),
{
    /// Run the entry phase. With a class contract, invariants wait for `finish`.
    pub fn new(class: ClassBinding<T>, mut checks: F) -> Self {
        let (enter, exit) = if class.is_bound() {
            (false, true)
        } else {
            (true, true)
        };
        checks(None, &CheckContext::entry(enter));
        Self {
            checks,
            class,
            exit_invariant: exit,
        }
    }

    /// Run the exit phase against the constructed value and hand it back.
    pub fn finish(mut self, value: T) -> T {
        if skip_while_unwinding(ScopeKind::Constructor, "exit") {
            return value;
        }
        (self.checks)(Some(&value), &CheckContext::exit(self.exit_invariant));
        if self.exit_invariant {
            self.class.enforce(&value, &CheckContext::invariant_only());
        }
        value
    }
}

// ── Loops ─────────────────────────────────────────────────

/// Evaluate a loop invariant block once, right now.
///
/// Call it at the top (or bottom) of each iteration. Only invariants are
/// live, and unlike scope guards it runs even while the thread is unwinding.
pub fn check_loop_invariant(checks: impl FnOnce(&CheckContext)) {
    checks(&CheckContext::invariant_only());
}
