//! # Slicestore Core
//!
//! Core traits and types for the slicestore state container.
//!
//! This crate provides the pure, synchronous half of the engine: the vocabulary
//! used to describe state transitions and the composer that assembles many
//! independently written slice reducers into one root reducer.
//!
//! ## Core Concepts
//!
//! - **Action**: Immutable description of an intended state change, tagged by a discriminant
//! - **Slice**: One named subtree of the overall state, owned by one reducer
//! - **Reducer**: Pure function `(Arc<State>, &Action) → Arc<State>`
//! - **State Tree**: Immutable mapping from slice name to slice state
//! - **Composer**: [`combine_reducers`] builds a root reducer over a [`StateTree`]
//!
//! ## Architecture Principles
//!
//! - Single source of truth
//! - State is never mutated in place, only replaced
//! - Unchanged slices are shared between trees (structural sharing)
//! - Unknown actions are passed through by returning the same `Arc`
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use slicestore_core::{combine_reducers, reducer_fn, Action, Reducer, SliceKey, INIT_ACTION_TYPE};
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Init,
//!     Increment,
//! }
//!
//! impl Action for CounterAction {
//!     fn action_type(&self) -> &'static str {
//!         match self {
//!             Self::Init => INIT_ACTION_TYPE,
//!             Self::Increment => "INCREMENT",
//!         }
//!     }
//!
//!     fn init() -> Self {
//!         Self::Init
//!     }
//! }
//!
//! const COUNT: SliceKey<u32> = SliceKey::new("count");
//!
//! let root = combine_reducers::<CounterAction>()
//!     .slice(COUNT, reducer_fn(|| 0_u32, |state: &Arc<u32>, action: &CounterAction| {
//!         match action {
//!             CounterAction::Increment => Arc::new(**state + 1),
//!             CounterAction::Init => Arc::clone(state),
//!         }
//!     }))
//!     .build()?;
//!
//! let tree = Arc::new(root.initial_state());
//! let next = root.reduce(&tree, &CounterAction::Increment);
//! assert_eq!(next.get(&COUNT).as_deref(), Some(&1));
//! # Ok::<(), slicestore_core::ComposeError>(())
//! ```

/// Action module - Discriminated inputs to reducers
pub mod action;

/// Reducer module - The pure state transition contract
pub mod reducer;

/// State module - Typed slice keys and the immutable state tree
pub mod state;

/// Reducer composition - Combining slice reducers into one root reducer
pub mod composition;

pub use action::{Action, INIT_ACTION_TYPE};
pub use composition::{CombineReducers, CombinedReducer, ComposeError, combine_reducers};
pub use reducer::{FnReducer, Reducer, reducer_fn};
pub use state::{SliceKey, StateError, StateTree, StateTreeBuilder};
