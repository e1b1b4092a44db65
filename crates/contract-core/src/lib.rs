//! Contract Core - Design-by-Contract enforcement for Rust
//!
//! Preconditions, postconditions and invariants are declared together in a
//! contract block and checked automatically at fixed points of a scope's
//! lifetime. A failed check is handed to one process-wide, swappable
//! violation handler that decides the program's fate.
//!
//! # Architecture
//!
//! ```text
//! contract block ─▶ scope guard ─▶ CheckContext (phase gate)
//!                        │                  │
//!                        ▼                  ▼ failed check
//!              class invariant      Violation ─▶ handler registry ─▶ abort / panic
//!              (bases first, then own)
//! ```
//!
//! # Guarantees
//!
//! - **Ordered**: entry checks run before the body, exit checks after it;
//!   nested scopes nest their checks in call-stack order
//! - **Unwind-safe**: exit checks never run while a panic is propagating, so
//!   the original failure is never masked
//! - **Structural**: a type opts into class invariants by implementing
//!   [`ClassContract`]; guards detect it at compile time
//! - **Terminal**: a violation is never recovered locally; the handler either
//!   aborts or panics
//!
//! # Example
//!
//! ```
//! use contract_core::{class_contract, contract, invariant, postcondition, precondition};
//!
//! pub struct Account {
//!     balance: i64,
//!     limit: i64,
//! }
//!
//! class_contract!(Account => |this, ctx| {
//!     invariant!(ctx, this.balance >= -this.limit, "overdraft beyond limit");
//! });
//!
//! impl Account {
//!     pub fn new(limit: i64) -> Self {
//!         let ctor = contract!(ctor Self, |_this, ctx| {
//!             precondition!(ctx, limit >= 0);
//!         });
//!         ctor.finish(Account { balance: 0, limit })
//!     }
//!
//!     pub fn deposit(&mut self, amount: i64) {
//!         let before = self.balance;
//!         let mut this = contract!(method self, |this, ctx| {
//!             precondition!(ctx, amount > 0);
//!             postcondition!(ctx, this.balance == before + amount);
//!         });
//!         this.balance += amount;
//!     }
//! }
//!
//! let mut account = Account::new(100);
//! account.deposit(25);
//! assert_eq!(account.balance, 25);
//! ```

pub mod class;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod handler;
mod macros;
pub mod violation;

pub use class::{ClassBinding, ClassContract};
pub use context::CheckContext;
pub use error::{Error, Result};
pub use guard::{check_loop_invariant, ConstructorGuard, FunctionGuard, MethodGuard, ScopeKind};
pub use handler::{get_handler, report, set_handler, Handler};
pub use violation::{SourceLocation, Violation, ViolationKind};


#[cfg(all(
    test,
    not(any(
        feature = "disable-preconditions",
        feature = "disable-postconditions",
        feature = "disable-invariants"
    ))
))]
mod tests {
    use super::*;
    use crate::handler::{catch_violation, raising, scoped};
    use crate::test_support::registry_lock;

    struct Gauge {
        level: u8,
    }

    class_contract!(Gauge => |this, ctx| {
        invariant!(ctx, this.level <= 10, "level out of range");
    });

    impl Gauge {
        fn raise_by(&mut self, step: u8) {
            let mut this = contract!(method self, |_this, ctx| {
                precondition!(ctx, step > 0);
            });
            this.level += step;
        }
    }

    #[test]
    fn test_macro_surface_end_to_end() {
        let _lock = registry_lock();
        let _handler = scoped(raising());

        let mut gauge = Gauge { level: 0 };
        assert!(catch_violation(|| gauge.raise_by(4)).is_ok());
        assert_eq!(gauge.level, 4);

        let err = catch_violation(|| gauge.raise_by(0)).unwrap_err();
        assert_eq!(err.violation().unwrap().kind, ViolationKind::Precondition);
        assert_eq!(err.violation().unwrap().condition, "step > 0");

        let err = catch_violation(|| gauge.raise_by(9)).unwrap_err();
        let violation = err.violation().unwrap();
        assert_eq!(violation.kind, ViolationKind::Invariant);
        assert_eq!(violation.message, "level out of range");
        assert_eq!(gauge.level, 13);
    }

    #[test]
    fn test_repeated_evaluation_is_stable() {
        let _lock = registry_lock();
        let _handler = scoped(raising());

        let mut gauge = Gauge { level: 0 };
        for i in 0..100 {
            let level = gauge.level;
            let result = catch_violation(|| gauge.raise_by(if level < 10 { 1 } else { 0 }));
            assert_eq!(result.is_ok(), i < 10, "iteration {}", i);
        }
    }
}
