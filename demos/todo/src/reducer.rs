//! Slice reducers for the todo example.
//!
//! Each reducer returns the state it was given for actions it does not
//! handle. Toggling rebuilds the list but keeps every untouched item's `Arc`.

use crate::types::{Todo, TodoAction, VisibilityFilter};
use slicestore_core::{CombinedReducer, ComposeError, Reducer, SliceKey, combine_reducers};
use std::sync::Arc;

/// The list of todos, oldest first
pub type Todos = Vec<Arc<Todo>>;

/// Slice owned by [`TodosReducer`]
pub const TODOS: SliceKey<Todos> = SliceKey::new("todos");

/// Slice owned by [`VisibilityFilterReducer`]
pub const VISIBILITY_FILTER: SliceKey<VisibilityFilter> = SliceKey::new("visibility_filter");

/// Reducer for a single todo item
///
/// Used by [`TodosReducer`] for every item in the list.
fn todo(state: &Arc<Todo>, action: &TodoAction) -> Arc<Todo> {
    match action {
        TodoAction::ToggleTodo { id } if *id == state.id => Arc::new(state.toggled()),
        _ => Arc::clone(state),
    }
}

/// Reducer for the `todos` slice
#[derive(Clone, Copy, Debug, Default)]
pub struct TodosReducer;

impl Reducer for TodosReducer {
    type State = Todos;
    type Action = TodoAction;

    fn initial_state(&self) -> Self::State {
        Vec::new()
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        match action {
            TodoAction::AddTodo { id, text } => {
                let mut next = Vec::with_capacity(state.len() + 1);
                next.extend(state.iter().cloned());
                next.push(Arc::new(Todo::new(*id, text.clone())));
                Arc::new(next)
            },
            TodoAction::ToggleTodo { id } => {
                if !state.iter().any(|item| item.id == *id) {
                    return Arc::clone(state);
                }
                Arc::new(state.iter().map(|item| todo(item, action)).collect())
            },
            TodoAction::Init | TodoAction::SetVisibilityFilter { .. } => Arc::clone(state),
        }
    }
}

/// Reducer for the `visibility_filter` slice
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityFilterReducer;

impl Reducer for VisibilityFilterReducer {
    type State = VisibilityFilter;
    type Action = TodoAction;

    fn initial_state(&self) -> Self::State {
        VisibilityFilter::ShowAll
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        match action {
            TodoAction::SetVisibilityFilter { filter } => Arc::new(*filter),
            _ => Arc::clone(state),
        }
    }
}

/// The root reducer: `{ todos, visibility_filter }`
///
/// # Errors
///
/// Never fails for this fixed set of slices; the `Result` comes from the
/// composer's own validation.
pub fn todo_app() -> Result<CombinedReducer<TodoAction>, ComposeError> {
    combine_reducers()
        .slice(TODOS, TodosReducer)
        .slice(VISIBILITY_FILTER, VisibilityFilterReducer)
        .build()
}
