//! Error types for contract enforcement
//!
//! The engine itself never returns errors: a failed check goes to the
//! handler, which does not return. [`Error`] is what the raising handler
//! panics with, and what [`crate::handler::catch_violation`] hands back.

use crate::Violation;

/// Contract enforcement errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A check failed while the raising handler was installed
    #[error(
        "{}: contract violation of type '{}': {}",
        .0.location,
        .0.kind,
        .0.message
    )]
    Violation(Violation),
}

impl Error {
    /// The failed check, if this error carries one
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Error::Violation(v) => Some(v),
        }
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        Error::Violation(violation)
    }
}

/// Result type alias for contract operations
pub type Result<T> = std::result::Result<T, Error>;
