//! Derived data read from the state tree.

use crate::reducer::{TODOS, Todos, VISIBILITY_FILTER};
use crate::types::{Todo, VisibilityFilter};
use slicestore_core::StateTree;
use std::sync::Arc;

/// Todos that pass `filter`, in list order
#[must_use]
pub fn visible_todos(todos: &[Arc<Todo>], filter: VisibilityFilter) -> Todos {
    todos
        .iter()
        .filter(|todo| filter.admits(todo))
        .cloned()
        .collect()
}

/// The current visibility filter
#[must_use]
pub fn current_filter(state: &StateTree) -> VisibilityFilter {
    state
        .get_ref(&VISIBILITY_FILTER)
        .copied()
        .unwrap_or_default()
}

/// Todos visible under the current filter
#[must_use]
pub fn select_visible_todos(state: &StateTree) -> Todos {
    state
        .get_ref(&TODOS)
        .map(|todos| visible_todos(todos, current_filter(state)))
        .unwrap_or_default()
}
