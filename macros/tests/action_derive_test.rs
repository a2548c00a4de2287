//! Tests for #[derive(Action)] macro

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use slicestore_core::{Action, INIT_ACTION_TYPE};
use slicestore_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum TodoAction {
    #[action(init)]
    Init,

    AddTodo {
        id: u64,
        text: String,
    },

    ToggleTodo {
        id: u64,
    },

    SetVisibilityFilter(String),

    #[action(rename = "todos/CLEAR")]
    ClearCompleted,
}

#[derive(Action, Clone, Debug)]
enum Wrapped<T: Clone + std::fmt::Debug + 'static> {
    #[action(init)]
    Init,
    Payload(T),
}

#[test]
fn test_action_types_follow_variant_names() {
    let add = TodoAction::AddTodo {
        id: 0,
        text: "a".to_string(),
    };
    assert_eq!(add.action_type(), "ADD_TODO");
    assert_eq!(TodoAction::ToggleTodo { id: 0 }.action_type(), "TOGGLE_TODO");
    assert_eq!(
        TodoAction::SetVisibilityFilter("SHOW_ALL".to_string()).action_type(),
        "SET_VISIBILITY_FILTER"
    );
}

#[test]
fn test_rename() {
    assert_eq!(TodoAction::ClearCompleted.action_type(), "todos/CLEAR");
}

#[test]
fn test_init_variant() {
    assert_eq!(TodoAction::init(), TodoAction::Init);
    assert_eq!(TodoAction::Init.action_type(), INIT_ACTION_TYPE);
    assert!(TodoAction::Init.is_init());
    assert!(!TodoAction::ClearCompleted.is_init());
}

#[test]
fn test_generic_enum() {
    assert_eq!(Wrapped::<u8>::Payload(1).action_type(), "PAYLOAD");
    assert!(Wrapped::<u8>::init().is_init());
}
