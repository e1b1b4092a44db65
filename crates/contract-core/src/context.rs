//! Check context - which kinds of checks are live for one evaluation
//!
//! A contract block is a closure that declares every check of a scope at
//! once. Each time the block runs, it receives a [`CheckContext`] that
//! decides which of those checks actually compare anything. Scope guards
//! build one context for the entry phase and a different one for the exit
//! phase.

use std::thread;

/// Phase gate for one evaluation of a contract block.
///
/// The three flags are fixed when the context is built. Unwinding is not
/// stored: [`CheckContext::check_postcondition`] asks the thread each time,
/// so a postcondition is never evaluated while a panic is propagating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckContext {
    precondition: bool,
    postcondition: bool,
    invariant: bool,
}

impl CheckContext {
    /// Every phase has to be stated; there is no default context.
    pub const fn new(precondition: bool, postcondition: bool, invariant: bool) -> Self {
        Self {
            precondition,
            postcondition,
            invariant,
        }
    }

    /// Entry phase of a guarded scope: preconditions, and invariants if `invariant`
    pub const fn entry(invariant: bool) -> Self {
        Self::new(true, false, invariant)
    }

    /// Exit phase of a guarded scope: postconditions, and invariants if `invariant`
    pub const fn exit(invariant: bool) -> Self {
        Self::new(false, true, invariant)
    }

    /// Invariants only. Used for loop iterations and class invariant bodies.
    pub const fn invariant_only() -> Self {
        Self::new(false, false, true)
    }

    pub fn check_precondition(&self) -> bool {
        self.precondition
    }

    /// False while the current thread is unwinding, whatever the stored flag says.
    pub fn check_postcondition(&self) -> bool {
        self.postcondition && !self.is_unwinding()
    }

    pub fn check_invariant(&self) -> bool {
        self.invariant
    }

    /// Whether a panic is currently propagating through this thread
    pub fn is_unwinding(&self) -> bool {
        thread::panicking()
    }
}
