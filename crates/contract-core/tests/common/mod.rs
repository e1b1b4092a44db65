//! Shared helpers for the integration tests
//!
//! Every test that can trigger a violation runs inside a [`ContractFrame`]:
//! it holds a process-wide lock (tests in one binary run in parallel and
//! share the handler slot) and installs a handler that records the
//! violation and raises it as a panic.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use contract_core::handler::{self, catch_violation, HandlerScope};
use contract_core::{Violation, ViolationKind};

static HANDLER_MUTEX: Mutex<()> = Mutex::new(());

/// Error raised by test bodies that is not a contract violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonContractError;

pub struct ContractFrame {
    // Field order matters: restore the handler before releasing the lock.
    _scope: HandlerScope,
    _lock: MutexGuard<'static, ()>,
    reported: Arc<Mutex<Vec<Violation>>>,
}

impl ContractFrame {
    /// Every violation the handler has seen inside this frame
    pub fn reported(&self) -> Vec<Violation> {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reported_kinds(&self) -> Vec<ViolationKind> {
        self.reported().iter().map(|v| v.kind).collect()
    }

    pub fn clear(&self) {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

pub fn frame() -> ContractFrame {
    let lock = HANDLER_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let scope = handler::scoped(Arc::new(move |v: &Violation| {
        sink.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(v.clone());
        handler::raise(v);
    }));
    ContractFrame {
        _scope: scope,
        _lock: lock,
        reported,
    }
}

/// Run `f` and require that it fails with exactly one violation of `kind`.
pub fn expect_violation<R>(
    frame: &ContractFrame,
    kind: ViolationKind,
    f: impl FnOnce() -> R,
) -> Violation {
    frame.clear();
    let err = match catch_violation(f) {
        Ok(_) => panic!("expected a {} violation, but none was reported", kind),
        Err(err) => err,
    };
    let violation = err.violation().expect("error carries a violation").clone();
    assert_eq!(violation.kind, kind, "wrong violation kind: {}", violation);
    assert_eq!(frame.reported(), vec![violation.clone()]);
    violation
}

/// As [`expect_violation`], also checking the reported message.
pub fn expect_violation_with_message<R>(
    frame: &ContractFrame,
    kind: ViolationKind,
    message: &str,
    f: impl FnOnce() -> R,
) -> Violation {
    let violation = expect_violation(frame, kind, f);
    assert_eq!(violation.message, message);
    violation
}

/// Run `f` and require that no violation is reported.
pub fn expect_pass<R>(frame: &ContractFrame, f: impl FnOnce() -> R) -> R {
    frame.clear();
    let value = catch_violation(f).unwrap_or_else(|e| panic!("unexpected violation: {}", e));
    assert!(frame.reported().is_empty());
    value
}
