//! The reducer contract.
//!
//! Reducers are pure functions: `(Arc<State>, &Action) → Arc<State>`.
//!
//! They never mutate the state they are given. A reducer that does not
//! recognise an action returns `Arc::clone(state)`, which lets the composer
//! and the store detect a no-op with `Arc::ptr_eq` instead of a deep compare.

use std::marker::PhantomData;
use std::sync::Arc;

/// The Reducer trait - core abstraction for state transitions
///
/// # Type Parameters
///
/// - `State`: The slice (or tree) state this reducer owns
/// - `Action`: The action type this reducer processes
///
/// # Contract
///
/// - Same `(state, action)` pair, same result
/// - Unknown action types return the *same* `Arc` (identity passthrough)
/// - Panics are reducer defects and propagate to the caller of `dispatch`
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use slicestore_core::Reducer;
///
/// #[derive(Clone, Debug)]
/// enum FilterAction {
///     Set(&'static str),
///     Other,
/// }
///
/// struct FilterReducer;
///
/// impl Reducer for FilterReducer {
///     type State = &'static str;
///     type Action = FilterAction;
///
///     fn initial_state(&self) -> Self::State {
///         "SHOW_ALL"
///     }
///
///     fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
///         match action {
///             FilterAction::Set(filter) => Arc::new(*filter),
///             FilterAction::Other => Arc::clone(state),
///         }
///     }
/// }
///
/// let state = Arc::new(FilterReducer.initial_state());
/// let same = FilterReducer.reduce(&state, &FilterAction::Other);
/// assert!(Arc::ptr_eq(&state, &same));
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State: Send + Sync + 'static;

    /// The action type this reducer processes
    type Action;

    /// State used when there is no prior value for this reducer
    fn initial_state(&self) -> Self::State;

    /// Compute the next state from the previous state and an action
    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State>;
}

impl<R: Reducer + ?Sized> Reducer for Box<R> {
    type State = R::State;
    type Action = R::Action;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        (**self).reduce(state, action)
    }
}

impl<R: Reducer + ?Sized> Reducer for Arc<R> {
    type State = R::State;
    type Action = R::Action;

    fn initial_state(&self) -> Self::State {
        (**self).initial_state()
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        (**self).reduce(state, action)
    }
}

/// Adapts a pair of plain functions into a [`Reducer`].
///
/// `initial` supplies the slice default, `reduce` is the transition function.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use slicestore_core::{reducer_fn, Reducer};
///
/// let todos = reducer_fn(Vec::<String>::new, |state: &Arc<Vec<String>>, action: &String| {
///     let mut next = (**state).clone();
///     next.push(action.clone());
///     Arc::new(next)
/// });
///
/// let state = Arc::new(todos.initial_state());
/// let next = todos.reduce(&state, &"milk".to_string());
/// assert_eq!(next.len(), 1);
/// ```
pub const fn reducer_fn<S, A, I, F>(initial: I, reduce: F) -> FnReducer<S, A, I, F>
where
    I: Fn() -> S,
    F: Fn(&Arc<S>, &A) -> Arc<S>,
{
    FnReducer {
        initial,
        reduce,
        _phantom: PhantomData,
    }
}

/// A reducer built from closures.
///
/// Created by [`reducer_fn`].
pub struct FnReducer<S, A, I, F> {
    initial: I,
    reduce: F,
    _phantom: PhantomData<fn(&A) -> S>,
}

impl<S, A, I, F> Reducer for FnReducer<S, A, I, F>
where
    S: Send + Sync + 'static,
    I: Fn() -> S,
    F: Fn(&Arc<S>, &A) -> Arc<S>,
{
    type State = S;
    type Action = A;

    fn initial_state(&self) -> Self::State {
        (self.initial)()
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        (self.reduce)(state, action)
    }
}

impl<S, A, I, F> std::fmt::Debug for FnReducer<S, A, I, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnReducer")
            .field("state", &std::any::type_name::<S>())
            .finish_non_exhaustive()
    }
}
