//! Check declaration macros
//!
//! Checks are written inside a contract block and take the block's
//! [`CheckContext`](crate::CheckContext) as their first argument:
//!
//! ```
//! use contract_core::{contract, precondition};
//!
//! fn checked_div(a: u32, b: u32) -> u32 {
//!     let _c = contract!(fun, |ctx| {
//!         precondition!(ctx, b != 0, "divisor must be non-zero");
//!         precondition!(ctx, a >= b, "{} is smaller than {}", a, b);
//!     });
//!     a / b
//! }
//! # assert_eq!(checked_div(9, 3), 3);
//! ```
//!
//! Each check accepts an optional message: a string literal, a format
//! string with arguments, or any expression implementing `Display`. Without
//! one, the message is the condition's source text.

/// Declare a precondition: checked on entry of the guarded scope.
#[macro_export]
macro_rules! precondition {
    ($($args:tt)+) => {
        $crate::__contract_check!(Precondition, check_precondition, $($args)+)
    };
}

/// Declare a postcondition: checked on normal exit of the guarded scope.
#[macro_export]
macro_rules! postcondition {
    ($($args:tt)+) => {
        $crate::__contract_check!(Postcondition, check_postcondition, $($args)+)
    };
}

/// Declare an invariant: checked wherever the context enables invariants.
#[macro_export]
macro_rules! invariant {
    ($($args:tt)+) => {
        $crate::__contract_check!(Invariant, check_invariant, $($args)+)
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __contract_check {
    (@emit $kind:ident, $gate:ident, $ctx:expr, $cond:expr, $msg:expr) => {{
        let ctx: &$crate::CheckContext = $ctx;
        if $crate::config::kind_enabled($crate::ViolationKind::$kind) && ctx.$gate() && !($cond) {
            $crate::handler::report(&$crate::Violation::new(
                $crate::ViolationKind::$kind,
                $msg,
                ::core::stringify!($cond),
                $crate::SourceLocation::new(::core::file!(), ::core::line!()),
            ));
        }
    }};
    ($kind:ident, $gate:ident, $ctx:expr, $cond:expr $(,)?) => {
        $crate::__contract_check!(@emit $kind, $gate, $ctx, $cond, ::core::stringify!($cond))
    };
    ($kind:ident, $gate:ident, $ctx:expr, $cond:expr, $msg:literal $(,)?) => {
        $crate::__contract_check!(@emit $kind, $gate, $ctx, $cond, $msg)
    };
    ($kind:ident, $gate:ident, $ctx:expr, $cond:expr, $fmt:literal, $($arg:tt)+) => {
        $crate::__contract_check!(@emit $kind, $gate, $ctx, $cond, ::std::format!($fmt, $($arg)+))
    };
    ($kind:ident, $gate:ident, $ctx:expr, $cond:expr, $msg:expr $(,)?) => {
        $crate::__contract_check!(@emit $kind, $gate, $ctx, $cond, ::std::string::ToString::to_string(&$msg))
    };
}

/// Open a contract block for the current scope.
///
/// | form                               | guard                                   |
/// |------------------------------------|-----------------------------------------|
/// | `contract!(fun, \|ctx\| ..)`          | [`FunctionGuard`](crate::FunctionGuard)  |
/// | `contract!(method subject, \|this, ctx\| ..)` | [`MethodGuard`](crate::MethodGuard) |
/// | `contract!(ctor Type, \|this, ctx\| ..)`      | [`ConstructorGuard`](crate::ConstructorGuard) |
/// | `contract!(dtor subject, \|this, ctx\| ..)`   | [`MethodGuard`](crate::MethodGuard) in destructor mode |
/// | `contract!(loop, \|ctx\| ..)`         | evaluated immediately                   |
///
/// The method, constructor and destructor forms bind the class invariant
/// of the subject's type when it implements
/// [`ClassContract`](crate::ClassContract). The type must be concrete at
/// the call site for that detection to see the impl.
///
/// Guards must be bound to a named variable (`let _c = ..`, not `let _ =`)
/// so they live until the end of the scope.
#[macro_export]
macro_rules! contract {
    (fun, $checks:expr $(,)?) => {
        $crate::FunctionGuard::new($checks)
    };
    (loop, $checks:expr $(,)?) => {
        $crate::check_loop_invariant($checks)
    };
    (method $subject:expr, $checks:expr $(,)?) => {{
        let subject = $subject;
        let class = $crate::__class_binding!(&*subject);
        $crate::MethodGuard::method(subject, class, $checks)
    }};
    (dtor $subject:expr, $checks:expr $(,)?) => {{
        let subject = $subject;
        let class = $crate::__class_binding!(&*subject);
        $crate::MethodGuard::destructor(subject, class, $checks)
    }};
    (ctor $ty:ty, $checks:expr $(,)?) => {{
        #[allow(unused_imports)]
        use $crate::class::{BoundProbe as _, UnboundProbe as _};
        let class = (&&$crate::class::Probe::<$ty>::new()).class_binding();
        $crate::ConstructorGuard::<$ty, _>::new(class, $checks)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __class_binding {
    ($obj:expr) => {{
        #[allow(unused_imports)]
        use $crate::class::{BoundProbe as _, UnboundProbe as _};
        (&&$crate::class::Probe::of($obj)).class_binding()
    }};
}

/// Run the class invariant of one base sub-object, if its type has one.
///
/// Building block of [`class_contract!`]; use it directly in a hand-written
/// [`ClassContract`](crate::ClassContract) impl.
#[macro_export]
macro_rules! base_invariant {
    ($ctx:expr, $base:expr $(,)?) => {{
        let base = $base;
        $crate::__class_binding!(base).enforce(base, $ctx);
    }};
}

/// Implement [`ClassContract`](crate::ClassContract) for a type.
///
/// Base sub-objects are listed by field after the type; each one whose type
/// has a class contract is checked, in the order given, before the body:
///
/// ```
/// use contract_core::{class_contract, invariant};
///
/// struct Counter { hits: u32, limit: u32 }
/// class_contract!(Counter => |this, ctx| {
///     invariant!(ctx, this.hits <= this.limit);
/// });
///
/// struct Labelled { counter: Counter, label: String }
/// class_contract!(Labelled: counter => |this, ctx| {
///     invariant!(ctx, !this.label.is_empty());
/// });
/// ```
///
/// Generic types name their parameters first:
/// `class_contract!(impl<T> Stack<T>: inner => |this, ctx| { .. })`.
/// Base fields of a generic parameter type are opaque to detection and are
/// treated as having no contract.
#[macro_export]
macro_rules! class_contract {
    (impl<$($gp:ident),+> $ty:ty $(: $($base:tt),+)? => $body:expr $(,)?) => {
        impl<$($gp),+> $crate::ClassContract for $ty {
            fn check_invariant(&self, ctx: &$crate::CheckContext) {
                $($( $crate::base_invariant!(ctx, &self.$base); )+)?
                let own: fn(&Self, &$crate::CheckContext) = $body;
                own(self, ctx);
            }
        }
    };
    ($ty:ty $(: $($base:tt),+)? => $body:expr $(,)?) => {
        impl $crate::ClassContract for $ty {
            fn check_invariant(&self, ctx: &$crate::CheckContext) {
                $($( $crate::base_invariant!(ctx, &self.$base); )+)?
                let own: fn(&Self, &$crate::CheckContext) = $body;
                own(self, ctx);
            }
        }
    };
}
