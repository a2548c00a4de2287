//! Reducer composition utilities
//!
//! [`combine_reducers`] turns a set of named slice reducers into one root
//! reducer over a [`StateTree`]:
//!
//! - Every slice reducer runs on every action, in registration order
//! - A slice with no prior value starts from its reducer's `initial_state()`
//! - The output tree holds exactly the registered slice names
//! - Slices a reducer passed through are shared with the previous tree
//!
//! The combined reducer is itself a [`Reducer`], so a combined tree can be
//! nested as a slice of a larger tree.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use slicestore_core::{combine_reducers, reducer_fn, Action, Reducer, SliceKey, INIT_ACTION_TYPE};
//!
//! #[derive(Clone, Debug)]
//! enum AppAction {
//!     Init,
//!     Increment,
//!     Rename(String),
//! }
//!
//! impl Action for AppAction {
//!     fn action_type(&self) -> &'static str {
//!         match self {
//!             Self::Init => INIT_ACTION_TYPE,
//!             Self::Increment => "INCREMENT",
//!             Self::Rename(_) => "RENAME",
//!         }
//!     }
//!
//!     fn init() -> Self {
//!         Self::Init
//!     }
//! }
//!
//! const COUNTER: SliceKey<i32> = SliceKey::new("counter");
//! const NAME: SliceKey<String> = SliceKey::new("name");
//!
//! let root = combine_reducers::<AppAction>()
//!     .slice(COUNTER, reducer_fn(|| 0, |state: &Arc<i32>, action: &AppAction| match action {
//!         AppAction::Increment => Arc::new(**state + 1),
//!         _ => Arc::clone(state),
//!     }))
//!     .slice(NAME, reducer_fn(String::new, |state: &Arc<String>, action: &AppAction| match action {
//!         AppAction::Rename(name) => Arc::new(name.clone()),
//!         _ => Arc::clone(state),
//!     }))
//!     .build()?;
//!
//! let before = Arc::new(root.initial_state());
//! let after = root.reduce(&before, &AppAction::Increment);
//!
//! assert_eq!(after.get(&COUNTER).as_deref(), Some(&1));
//! assert!(after.slice_ptr_eq(&before, "name")); // untouched slice is shared
//! # Ok::<(), slicestore_core::ComposeError>(())
//! ```

use crate::action::Action;
use crate::reducer::Reducer;
use crate::state::{SliceKey, SliceValue, Slices, StateTree};
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors from assembling a combined reducer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// No slice reducer was registered
    #[error("Cannot combine an empty set of reducers")]
    Empty,

    /// Two slice reducers were registered under the same name
    #[error("Slice '{0}' is registered more than once")]
    DuplicateSlice(&'static str),
}

/// One registered slice, with its state type erased.
trait SliceEntry<A> {
    fn name(&self) -> &'static str;

    fn initial(&self) -> SliceValue;

    fn reduce(&self, previous: Option<&SliceValue>, action: &A) -> SliceValue;
}

struct TypedSlice<R: Reducer> {
    key: SliceKey<R::State>,
    reducer: R,
}

impl<A, R> SliceEntry<A> for TypedSlice<R>
where
    R: Reducer<Action = A>,
{
    fn name(&self) -> &'static str {
        self.key.name()
    }

    fn initial(&self) -> SliceValue {
        Arc::new(self.reducer.initial_state())
    }

    fn reduce(&self, previous: Option<&SliceValue>, action: &A) -> SliceValue {
        let state = match previous.map(|value| Arc::clone(value).downcast::<R::State>()) {
            Some(Ok(state)) => state,
            Some(Err(_)) => {
                tracing::warn!(
                    slice = self.key.name(),
                    expected = type_name::<R::State>(),
                    "Slice holds a value of another type, starting from its initial state"
                );
                Arc::new(self.reducer.initial_state())
            },
            None => Arc::new(self.reducer.initial_state()),
        };

        self.reducer.reduce(&state, action)
    }
}

/// Start combining slice reducers for action type `A`.
///
/// Add slices with [`CombineReducers::slice`] and finish with
/// [`CombineReducers::build`].
#[must_use]
pub fn combine_reducers<A: Action>() -> CombineReducers<A> {
    CombineReducers { slices: Vec::new() }
}

/// Builder returned by [`combine_reducers`].
pub struct CombineReducers<A> {
    slices: Vec<Box<dyn SliceEntry<A>>>,
}

impl<A: Action> CombineReducers<A> {
    /// Register `reducer` as the owner of the slice named by `key`
    #[must_use]
    pub fn slice<R>(mut self, key: SliceKey<R::State>, reducer: R) -> Self
    where
        R: Reducer<Action = A> + 'static,
    {
        self.slices.push(Box::new(TypedSlice { key, reducer }));
        self
    }

    /// Finish composition
    ///
    /// # Errors
    ///
    /// - [`ComposeError::Empty`] if no slice was registered
    /// - [`ComposeError::DuplicateSlice`] if a name was registered twice
    pub fn build(self) -> Result<CombinedReducer<A>, ComposeError> {
        if self.slices.is_empty() {
            return Err(ComposeError::Empty);
        }

        for (index, slice) in self.slices.iter().enumerate() {
            if self.slices[..index]
                .iter()
                .any(|earlier| earlier.name() == slice.name())
            {
                return Err(ComposeError::DuplicateSlice(slice.name()));
            }
        }

        Ok(CombinedReducer {
            slices: self.slices,
        })
    }
}

impl<A> fmt::Debug for CombineReducers<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombineReducers")
            .field(
                "slices",
                &self.slices.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// A root reducer that owns one reducer per slice.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<A> {
    slices: Vec<Box<dyn SliceEntry<A>>>,
}

impl<A> CombinedReducer<A> {
    /// Slice names in composition order
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.iter().map(|slice| slice.name())
    }

    fn warn_unexpected_keys(&self, state: &StateTree) {
        let unexpected: Vec<&'static str> = state
            .keys()
            .filter(|key| !self.slices.iter().any(|slice| slice.name() == *key))
            .collect();

        if !unexpected.is_empty() {
            tracing::warn!(
                unexpected = ?unexpected,
                expected = ?self.slice_names().collect::<Vec<_>>(),
                "Preloaded state has slices no reducer owns; they will be ignored"
            );
        }
    }
}

impl<A: Action> Reducer for CombinedReducer<A> {
    type State = StateTree;
    type Action = A;

    fn initial_state(&self) -> Self::State {
        StateTree::from_slices(
            self.slices
                .iter()
                .map(|slice| (slice.name(), slice.initial()))
                .collect(),
        )
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        if action.is_init() {
            self.warn_unexpected_keys(state);
        }

        let next: Slices = self
            .slices
            .iter()
            .map(|slice| (slice.name(), slice.reduce(state.raw(slice.name()), action)))
            .collect();

        Arc::new(StateTree::from_slices(next))
    }
}

impl<A> fmt::Debug for CombinedReducer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("slices", &self.slice_names().collect::<Vec<_>>())
            .finish()
    }
}
