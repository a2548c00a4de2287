//! # Slicestore Runtime
//!
//! Runtime implementation for the slicestore state container.
//!
//! This crate provides the [`Store`]: the single owner of the current state,
//! the root reducer, and the ordered list of subscribers.
//!
//! ## Core Components
//!
//! - **Store**: Holds state, runs the reducer, notifies subscribers
//! - **Subscription**: Revocation handle for one listener registration
//! - **Dispatch**: Cloneable dispatch function handed to presentation code
//!
//! ## Update Cycle
//!
//! `dispatch(action)` → reducer computes the next state → state is replaced →
//! every listener registered when the dispatch started is called, in
//! registration order → the action is returned.
//!
//! The store is synchronous and single-threaded. Nothing is deferred and
//! nothing runs in the background.
//!
//! ## Example
//!
//! ```ignore
//! use slicestore_runtime::Store;
//!
//! let store = Store::new(root_reducer);
//!
//! let weak = store.downgrade();
//! let subscription = store.subscribe(move || {
//!     if let Some(store) = weak.upgrade() {
//!         println!("{:?}", store.get_state());
//!     }
//! })?;
//!
//! store.dispatch(TodoAction::AddTodo { id: 0, text: "milk".into() })?;
//! subscription.unsubscribe()?;
//! ```

/// Metric names and the Prometheus recorder
pub mod metrics;

/// Store module - state ownership, dispatch and subscriptions
pub mod store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// `dispatch` was called while the reducer was running
        ///
        /// Reducers must not dispatch. The state is left as it was before the
        /// outer dispatch's reducer started.
        #[error("Cannot dispatch '{action_type}' while a reducer is running")]
        ReentrantDispatch {
            /// Discriminant of the rejected action
            action_type: &'static str,
        },

        /// The caller dispatched the reserved init action
        #[error("Action type '{0}' is reserved for store initialization")]
        ReservedActionType(&'static str),

        /// `subscribe` was called while the reducer was running
        #[error("Cannot subscribe while a reducer is running")]
        SubscribeWhileReducing,

        /// `unsubscribe` was called while the reducer was running
        #[error("Cannot unsubscribe while a reducer is running")]
        UnsubscribeWhileReducing,

        /// One or more listeners panicked during notification
        ///
        /// The state was replaced and every other listener was still called.
        #[error("{failed} of {notified} listeners panicked during notification")]
        ListenerPanicked {
            /// Number of listeners that panicked
            failed: usize,
            /// Number of listeners in the notification pass
            notified: usize,
        },

        /// A dispatch handle outlived its store
        #[error("Store has been dropped")]
        StoreDropped,
    }
}

pub use error::StoreError;
pub use store::{Dispatch, ListenerId, Store, Subscription, WeakStore};

/// What the store does when a listener panics during notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListenerFailurePolicy {
    /// Catch the panic, keep notifying the remaining listeners, then report
    /// [`StoreError::ListenerPanicked`] from `dispatch`
    #[default]
    Isolate,

    /// Let the panic unwind out of `dispatch`; later listeners are skipped
    Propagate,
}

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use slicestore_runtime::{ListenerFailurePolicy, StoreConfig};
///
/// let config = StoreConfig::default()
///     .with_name("todos")
///     .with_listener_failure_policy(ListenerFailurePolicy::Propagate);
///
/// assert_eq!(config.name, "todos");
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Label used in tracing spans and metrics
    pub name: String,
    /// Handling of panicking listeners
    pub listener_failure_policy: ListenerFailurePolicy,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub fn new(name: impl Into<String>, listener_failure_policy: ListenerFailurePolicy) -> Self {
        Self {
            name: name.into(),
            listener_failure_policy,
        }
    }

    /// Set the store name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the listener failure policy
    #[must_use]
    pub const fn with_listener_failure_policy(mut self, policy: ListenerFailurePolicy) -> Self {
        self.listener_failure_policy = policy;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "store".to_string(),
            listener_failure_policy: ListenerFailurePolicy::default(),
        }
    }
}
