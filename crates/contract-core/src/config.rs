//! Build-time configuration
//!
//! Checks are switched off per kind with Cargo features on this crate:
//!
//! ```toml
//! contract-core = { version = "0.1", features = ["disable-postconditions"] }
//! ```
//!
//! The check macros consult [`kind_enabled`] rather than `cfg!`, because a
//! `cfg!` inside a `macro_rules!` expansion would read the features of the
//! calling crate instead of this one.

use serde::{Deserialize, Serialize};

use crate::ViolationKind;

pub const PRECONDITIONS_ENABLED: bool = !cfg!(feature = "disable-preconditions");
pub const POSTCONDITIONS_ENABLED: bool = !cfg!(feature = "disable-postconditions");
pub const INVARIANTS_ENABLED: bool = !cfg!(feature = "disable-invariants");

/// Library version, e.g. `"0.1.0"`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library version as `major * 10000 + minor * 100 + patch`
pub const VERSION_NUMBER: u32 = parse_component(env!("CARGO_PKG_VERSION_MAJOR")) * 10_000
    + parse_component(env!("CARGO_PKG_VERSION_MINOR")) * 100
    + parse_component(env!("CARGO_PKG_VERSION_PATCH"));

const fn parse_component(digits: &str) -> u32 {
    let bytes = digits.as_bytes();
    let mut value = 0;
    let mut i = 0;
    while i < bytes.len() {
        value = value * 10 + (bytes[i] - b'0') as u32;
        i += 1;
    }
    value
}

/// Whether checks of `kind` were compiled in
pub const fn kind_enabled(kind: ViolationKind) -> bool {
    match kind {
        ViolationKind::Precondition => PRECONDITIONS_ENABLED,
        ViolationKind::Postcondition => POSTCONDITIONS_ENABLED,
        ViolationKind::Invariant => INVARIANTS_ENABLED,
    }
}

/// Snapshot of the build switches, e.g. for startup diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    pub preconditions: bool,
    pub postconditions: bool,
    pub invariants: bool,
}

impl BuildConfig {
    pub const fn current() -> Self {
        Self {
            preconditions: PRECONDITIONS_ENABLED,
            postconditions: POSTCONDITIONS_ENABLED,
            invariants: INVARIANTS_ENABLED,
        }
    }

    pub fn is_enabled(&self, kind: ViolationKind) -> bool {
        match kind {
            ViolationKind::Precondition => self.preconditions,
            ViolationKind::Postcondition => self.postconditions,
            ViolationKind::Invariant => self.invariants,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::current()
    }
}
