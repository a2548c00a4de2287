//! Actions are the only way to describe a state change.
//!
//! An action is an immutable value with a discriminant ([`Action::action_type`])
//! and zero or more payload fields. In Rust this is an enum with one variant per
//! action kind, so reducers get exhaustive matching instead of string dispatch.
//!
//! One discriminant is reserved: [`INIT_ACTION_TYPE`]. The store reduces it once
//! at creation time so every slice reducer can settle to its default. Reducers
//! must treat it like any other unknown action and pass their state through.

use std::fmt::Debug;

/// Discriminant of the synthetic action a store reduces when it is created.
///
/// No user action may report this type; `Store::dispatch` rejects it.
pub const INIT_ACTION_TYPE: &str = "@@slicestore/INIT";

/// An input to a reducer
///
/// Use `#[derive(Action)]` from `slicestore-macros` to generate the
/// discriminant from variant names (`AddTodo` becomes `"ADD_TODO"`).
///
/// # Example
///
/// ```
/// use slicestore_core::{Action, INIT_ACTION_TYPE};
///
/// #[derive(Clone, Debug)]
/// enum FilterAction {
///     Init,
///     SetFilter { filter: String },
/// }
///
/// impl Action for FilterAction {
///     fn action_type(&self) -> &'static str {
///         match self {
///             Self::Init => INIT_ACTION_TYPE,
///             Self::SetFilter { .. } => "SET_FILTER",
///         }
///     }
///
///     fn init() -> Self {
///         Self::Init
///     }
/// }
///
/// assert!(FilterAction::init().is_init());
/// assert_eq!(FilterAction::SetFilter { filter: "all".into() }.action_type(), "SET_FILTER");
/// ```
pub trait Action: Clone + Debug + 'static {
    /// The discriminant of this action
    fn action_type(&self) -> &'static str;

    /// The reserved init action
    ///
    /// Must report [`INIT_ACTION_TYPE`] from [`Action::action_type`].
    fn init() -> Self;

    /// Returns true if this is the reserved init action
    fn is_init(&self) -> bool {
        self.action_type() == INIT_ACTION_TYPE
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    enum TestAction {
        Init,
        Ping,
    }

    impl Action for TestAction {
        fn action_type(&self) -> &'static str {
            match self {
                Self::Init => INIT_ACTION_TYPE,
                Self::Ping => "PING",
            }
        }

        fn init() -> Self {
            Self::Init
        }
    }

    #[test]
    fn test_init_is_reserved() {
        assert!(TestAction::init().is_init());
        assert!(!TestAction::Ping.is_init());
        assert_eq!(TestAction::init().action_type(), INIT_ACTION_TYPE);
    }
}
