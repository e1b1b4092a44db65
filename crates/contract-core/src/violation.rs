//! Violation records - the data handed to the handler when a check fails
//!
//! A [`Violation`] is built exactly once per failed check by the check
//! macros and passed by reference to the active handler. Nothing in the
//! engine keeps it after the handler call.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Kind ──────────────────────────────────────────────────

/// Which kind of check failed.
///
/// Always matches the macro that produced the record: `precondition!`
/// yields [`ViolationKind::Precondition`] and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    /// Required on entry of a guarded scope.
    Precondition,
    /// Required on the normal (non-panicking) exit of a guarded scope.
    Postcondition,
    /// Required at designated checkpoints: scope entry/exit, loop iterations.
    Invariant,
}

impl ViolationKind {
    /// All kinds, in declaration order.
    pub const ALL: [ViolationKind; 3] = [
        ViolationKind::Precondition,
        ViolationKind::Postcondition,
        ViolationKind::Invariant,
    ];

    /// Lowercase name used in diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::Precondition => "precondition",
            ViolationKind::Postcondition => "postcondition",
            ViolationKind::Invariant => "invariant",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Location ──────────────────────────────────────────────

/// Source position of the failed check (`file!()` / `line!()` at the call site)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: Cow<'static, str>,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<Cow<'static, str>>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// ── Record ────────────────────────────────────────────────

/// A failed contract check.
///
/// `message` defaults to the condition text when the check was declared
/// without one. Static strings are borrowed, so reporting a violation with
/// the default message does not allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: Cow<'static, str>,
    pub condition: Cow<'static, str>,
    pub location: SourceLocation,
}

impl Violation {
    pub fn new(
        kind: ViolationKind,
        message: impl Into<Cow<'static, str>>,
        condition: impl Into<Cow<'static, str>>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            condition: condition.into(),
            location,
        }
    }

    /// First line of the diagnostic, without the trailing message/condition lines
    pub fn headline(&self) -> String {
        format!(
            "{}: error: contract violation of type '{}'",
            self.location, self.kind
        )
    }
}

/// Renders the three-line diagnostic written by the default handler:
///
/// ```text
/// src/account.rs:42: error: contract violation of type 'precondition'
/// message:   amount must be positive
/// condition: amount > 0
/// ```
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.headline())?;
        writeln!(f, "message:   {}", self.message)?;
        write!(f, "condition: {}", self.condition)
    }
}
