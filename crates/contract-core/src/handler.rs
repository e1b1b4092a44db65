//! Violation handler registry
//!
//! One process-wide slot holds the handler that decides what a failed check
//! does. It starts out as [`default_handler`], which prints a diagnostic to
//! stderr and aborts. Tests usually swap in [`raise`], which panics with
//! [`Error::Violation`] so the failure can be caught and inspected.
//!
//! # Handler contract
//!
//! A handler must not return. It either ends the process or leaves the
//! current control flow by panicking. If it returns anyway, [`report`]
//! aborts the process.
//!
//! # Concurrency
//!
//! The slot is behind a `RwLock`, so swapping from several threads is
//! memory-safe, but which handler a concurrent violation sees is a race.
//! Install the handler once at startup, or serialise swaps yourself.

use std::io::{self, IsTerminal, Write};
use std::panic::{self, AssertUnwindSafe};
use std::process;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::thread;

use colored::Colorize;

use crate::{Error, Result, Violation};

/// A violation handler. Must not return (see the module docs).
pub type Handler = Arc<dyn Fn(&Violation) + Send + Sync + 'static>;

static HANDLER: LazyLock<RwLock<Handler>> = LazyLock::new(|| RwLock::new(default_handler()));

// ── Registry ──────────────────────────────────────────────

/// Install `handler` and return the one it replaces.
///
/// Passing the returned handler back to `set_handler` restores the previous
/// behaviour exactly.
pub fn set_handler(handler: Handler) -> Handler {
    let mut slot = HANDLER.write().unwrap_or_else(PoisonError::into_inner);
    tracing::debug!("installing contract violation handler");
    std::mem::replace(&mut *slot, handler)
}

/// The handler currently installed
pub fn get_handler() -> Handler {
    HANDLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Hand a failed check to the installed handler. Never returns.
///
/// The handler is called outside the registry lock, so it may itself call
/// [`set_handler`]. If the thread is already panicking, this is a double
/// fault: the process aborts whether the handler unwinds or returns.
pub fn report(violation: &Violation) -> ! {
    let handler = get_handler();
    tracing::debug!(
        kind = %violation.kind,
        file = %violation.location.file,
        line = violation.location.line,
        "contract violation"
    );

    if thread::panicking() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(violation)));
        if outcome.is_err() {
            tracing::error!(
                kind = %violation.kind,
                "violation handler unwound while another panic was in flight; aborting"
            );
        } else {
            tracing::error!(
                kind = %violation.kind,
                "violation handler returned during unwinding; aborting"
            );
        }
        process::abort();
    }

    handler(violation);
    tracing::error!(kind = %violation.kind, "violation handler returned; aborting");
    process::abort()
}

// ── Stock handlers ────────────────────────────────────────

/// Write the diagnostic to stderr and abort.
///
/// ```text
/// <file>:<line>: error: contract violation of type '<kind>'
/// message:   <message>
/// condition: <condition>
/// ```
///
/// `error:` is highlighted when stderr is a terminal.
pub fn print_and_abort(violation: &Violation) {
    let stderr = io::stderr();
    let colorize = stderr.is_terminal();
    let mut out = stderr.lock();
    let label = if colorize {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    };
    // Nothing useful to do if stderr is gone; abort regardless.
    let _ = writeln!(
        out,
        "{}: {} contract violation of type '{}'\nmessage:   {}\ncondition: {}",
        violation.location, label, violation.kind, violation.message, violation.condition
    );
    let _ = out.flush();
    process::abort();
}

/// Panic with [`Error::Violation`] as the payload.
///
/// Pair with [`catch_violation`] to turn violations into testable results.
pub fn raise(violation: &Violation) {
    panic::panic_any(Error::Violation(violation.clone()));
}

/// The handler installed at process start
pub fn default_handler() -> Handler {
    Arc::new(print_and_abort)
}

/// A handler that panics with [`Error::Violation`]
pub fn raising() -> Handler {
    Arc::new(raise)
}

// ── Scoped installation ───────────────────────────────────

/// Restores the previously installed handler when dropped.
#[must_use = "the previous handler is restored as soon as the scope is dropped"]
pub struct HandlerScope {
    previous: Option<Handler>,
}

impl HandlerScope {
    /// The handler that will be restored
    pub fn previous(&self) -> Option<&Handler> {
        self.previous.as_ref()
    }
}

impl Drop for HandlerScope {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            tracing::debug!("restoring previous contract violation handler");
            set_handler(previous);
        }
    }
}

/// Install `handler` until the returned scope is dropped.
pub fn scoped(handler: Handler) -> HandlerScope {
    HandlerScope {
        previous: Some(set_handler(handler)),
    }
}

// ── Catching ──────────────────────────────────────────────

/// Run `f`, turning a violation raised by [`raise`] into `Err`.
///
/// Any other panic keeps propagating untouched.
pub fn catch_violation<R>(f: impl FnOnce() -> R) -> Result<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<Error>() {
            Ok(err) => Err(*err),
            Err(other) => panic::resume_unwind(other),
        },
    }
}
