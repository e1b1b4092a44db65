//! Process-level behaviour of the handler registry.
//!
//! These scenarios end the process, so each one re-runs this test binary
//! as a child with a scenario name in the environment and inspects its
//! exit status and stderr.

use std::env;
use std::process::{Command, Output};
use std::sync::Arc;

use contract_core::handler::{self, Handler};
use contract_core::{class_contract, contract, invariant, postcondition, precondition, Violation};

const SCENARIO_VAR: &str = "CONTRACT_CORE_TEST_SCENARIO";

// ── Helpers ───────────────────────────────────────────────

fn run_scenario(name: &str) -> Output {
    Command::new(env::current_exe().expect("test binary path"))
        .args(["child_entry", "--exact", "--nocapture", "--test-threads=1"])
        .env(SCENARIO_VAR, name)
        .output()
        .expect("failed to re-run test binary")
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_aborted(output: &Output) {
    assert!(!output.status.success(), "child should not exit cleanly");
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(
            output.status.signal(),
            Some(6),
            "child should die by SIGABRT, got {:?}\nstderr:\n{}",
            output.status,
            stderr_of(output)
        );
    }
}

/// The three diagnostic lines, consecutive, in this order.
fn assert_diagnostic(stderr: &str, kind: &str, message: &str, condition: &str) {
    let lines: Vec<&str> = stderr.lines().collect();
    let head = format!(": error: contract violation of type '{}'", kind);
    let at = lines
        .iter()
        .position(|l| l.starts_with(file!()) && l.ends_with(&head))
        .unwrap_or_else(|| panic!("no diagnostic headline in stderr:\n{}", stderr));
    assert_eq!(lines[at + 1], format!("message:   {}", message));
    assert_eq!(lines[at + 2], format!("condition: {}", condition));
}

// ── Child side ────────────────────────────────────────────

fn withdraw(amount: i64) {
    let _c = contract!(fun, |ctx| {
        precondition!(ctx, amount > 0, "amount must be positive");
    });
}

fn finish_with(ok: bool) {
    let _c = contract!(fun, |ctx| {
        postcondition!(ctx, ok);
    });
}

struct FailsWhileUnwinding;

impl Drop for FailsWhileUnwinding {
    fn drop(&mut self) {
        contract!(loop, |ctx| {
            invariant!(ctx, false, "double fault");
        });
    }
}

struct Hatch {
    sealed: bool,
}

class_contract!(Hatch => |this, ctx| {
    invariant!(ctx, this.sealed, "hatch dropped unsealed");
});

impl Drop for Hatch {
    fn drop(&mut self) {
        let _c = contract!(dtor self, |_this, _ctx| {});
    }
}

#[test]
fn child_entry() {
    let Ok(scenario) = env::var(SCENARIO_VAR) else {
        return;
    };
    match scenario.as_str() {
        "default-precondition" => withdraw(0),
        "default-postcondition" => finish_with(false),
        "returning-handler" => {
            let quiet: Handler = Arc::new(|_: &Violation| {});
            handler::set_handler(quiet);
            eprintln!("before violation");
            withdraw(-5);
            eprintln!("after violation");
        }
        "double-fault" => {
            handler::set_handler(handler::raising());
            let _guard = FailsWhileUnwinding;
            panic!("original failure");
        }
        "dtor-while-unwinding" => {
            let _hatch = Hatch { sealed: false };
            panic!("original failure");
        }
        other => panic!("unknown scenario {}", other),
    }
    eprintln!("scenario finished without aborting");
}

// ── Parent side ───────────────────────────────────────────

#[test]
#[cfg_attr(feature = "disable-preconditions", ignore)]
fn test_default_handler_reports_precondition_and_aborts() {
    let output = run_scenario("default-precondition");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert_diagnostic(&stderr, "precondition", "amount must be positive", "amount > 0");
    assert!(!stderr.contains("scenario finished"));
}

#[test]
#[cfg_attr(feature = "disable-postconditions", ignore)]
fn test_default_handler_reports_postcondition_and_aborts() {
    let output = run_scenario("default-postcondition");
    assert_aborted(&output);
    assert_diagnostic(&stderr_of(&output), "postcondition", "ok", "ok");
}

#[test]
#[cfg_attr(feature = "disable-preconditions", ignore)]
fn test_handler_that_returns_still_terminates() {
    let output = run_scenario("returning-handler");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("before violation"));
    assert!(!stderr.contains("after violation"));
}

#[test]
#[cfg_attr(feature = "disable-invariants", ignore)]
fn test_violation_while_unwinding_is_fatal() {
    let output = run_scenario("double-fault");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("original failure"));
    assert!(!stderr.contains("scenario finished"));
}

#[test]
#[cfg_attr(feature = "disable-invariants", ignore)]
fn test_destructor_entry_failure_while_unwinding_aborts() {
    let output = run_scenario("dtor-while-unwinding");
    assert_aborted(&output);
    let stderr = stderr_of(&output);
    assert!(stderr.contains("original failure"));
    assert_diagnostic(&stderr, "invariant", "hatch dropped unsealed", "this.sealed");
}
