//! Domain types for the todo example.
//!
//! Two slices make up the state: the list of todos and the visibility
//! filter. Actions are a tagged enum; `#[derive(Action)]` supplies the
//! discriminants (`ADD_TODO`, `TOGGLE_TODO`, `SET_VISIBILITY_FILTER`).

use serde::{Deserialize, Serialize};
use slicestore_macros::Action;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Identifier of a todo item
pub type TodoId = u64;

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// What needs doing
    pub text: String,
    /// Whether the todo is done
    pub completed: bool,
}

impl Todo {
    /// A new, not yet completed todo
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// A copy with `completed` flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }
}

/// Which todos the list shows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisibilityFilter {
    /// Every todo
    #[default]
    ShowAll,
    /// Completed todos only
    ShowCompleted,
    /// Todos still to do
    ShowActive,
}

impl VisibilityFilter {
    /// Every filter, in footer order
    pub const ALL: [Self; 3] = [Self::ShowAll, Self::ShowCompleted, Self::ShowActive];

    /// Wire name, e.g. `SHOW_COMPLETED`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowAll => "SHOW_ALL",
            Self::ShowCompleted => "SHOW_COMPLETED",
            Self::ShowActive => "SHOW_ACTIVE",
        }
    }

    /// Footer link label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShowAll => "All",
            Self::ShowCompleted => "Completed",
            Self::ShowActive => "Active",
        }
    }

    /// Returns true if `todo` passes this filter
    #[must_use]
    pub const fn admits(self, todo: &Todo) -> bool {
        match self {
            Self::ShowAll => true,
            Self::ShowCompleted => todo.completed,
            Self::ShowActive => !todo.completed,
        }
    }
}

impl fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can happen to the todo state
#[derive(Action, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoAction {
    /// Reserved store initialization
    #[action(init)]
    Init,

    /// Append a todo
    AddTodo {
        /// Id from an [`IdGenerator`]
        id: TodoId,
        /// What needs doing
        text: String,
    },

    /// Flip the `completed` flag of one todo
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Change which todos are shown
    SetVisibilityFilter {
        /// New filter
        filter: VisibilityFilter,
    },
}

/// Hands out sequential todo ids
///
/// Clones share the same counter.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    next: Rc<Cell<TodoId>>,
}

impl IdGenerator {
    /// A generator whose first id is 0
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator whose first id is `first`
    #[must_use]
    pub fn starting_at(first: TodoId) -> Self {
        Self {
            next: Rc::new(Cell::new(first)),
        }
    }

    /// Take the next id
    pub fn next_id(&self) -> TodoId {
        let id = self.next.get();
        self.next.set(id + 1);
        id
    }

    /// Action creator for [`TodoAction::AddTodo`] with a fresh id
    pub fn add_todo(&self, text: impl Into<String>) -> TodoAction {
        TodoAction::AddTodo {
            id: self.next_id(),
            text: text.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use slicestore_core::Action;

    #[test]
    fn test_action_types() {
        assert_eq!(
            TodoAction::AddTodo {
                id: 0,
                text: "a".into()
            }
            .action_type(),
            "ADD_TODO"
        );
        assert_eq!(TodoAction::ToggleTodo { id: 0 }.action_type(), "TOGGLE_TODO");
        assert_eq!(
            TodoAction::SetVisibilityFilter {
                filter: VisibilityFilter::ShowActive
            }
            .action_type(),
            "SET_VISIBILITY_FILTER"
        );
        assert!(TodoAction::init().is_init());
    }

    #[test]
    fn test_id_generator_is_sequential_and_shared() {
        let ids = IdGenerator::new();
        let clone = ids.clone();

        assert_eq!(
            ids.add_todo("a"),
            TodoAction::AddTodo {
                id: 0,
                text: "a".into()
            }
        );
        assert_eq!(clone.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(IdGenerator::starting_at(10).next_id(), 10);
    }

    #[test]
    fn test_filter_wire_names() {
        assert_eq!(
            serde_json::to_value(VisibilityFilter::ShowCompleted).unwrap(),
            serde_json::json!("SHOW_COMPLETED")
        );
        for filter in VisibilityFilter::ALL {
            assert_eq!(
                serde_json::to_value(filter).unwrap(),
                serde_json::json!(filter.as_str())
            );
        }
    }

    #[test]
    fn test_filter_admits() {
        let open = Todo::new(0, "a");
        let done = open.toggled();

        assert!(VisibilityFilter::ShowAll.admits(&open));
        assert!(VisibilityFilter::ShowActive.admits(&open));
        assert!(!VisibilityFilter::ShowCompleted.admits(&open));
        assert!(VisibilityFilter::ShowCompleted.admits(&done));
        assert!(!done.toggled().completed);
    }
}
