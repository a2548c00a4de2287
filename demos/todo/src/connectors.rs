//! Connected components: presentation components bound to the todo store.

use crate::components::{AddTodoForm, TextInput, link, todo_list};
use crate::selectors::{current_filter, select_visible_todos};
use crate::types::{IdGenerator, TodoAction, VisibilityFilter};
use crate::view::View;
use serde_json::json;
use slicestore_connect::{Callback, Component, ConnectedComponent, Connector, Props, connect};
use slicestore_core::StateTree;

/// The list of todos passing the current filter; clicking one toggles it
pub fn visible_todo_list()
-> ConnectedComponent<StateTree, TodoAction, impl Component<TodoAction, Output = View>> {
    connect(|state: &StateTree, _own: &Props<TodoAction>| {
        Props::new().with("todos", json!(select_visible_todos(state)))
    })
    .with_dispatch(|dispatch, _own| {
        let dispatch = dispatch.clone();
        Props::new().with(
            "on_todo_click",
            Callback::new(move |id| match id.as_u64() {
                Some(id) => dispatch.dispatch(TodoAction::ToggleTodo { id }).map(|_| ()),
                None => {
                    tracing::warn!(%id, "Ignoring click without a todo id");
                    Ok(())
                },
            }),
        )
    })
    .wrap(todo_list)
    .named("visible_todo_list")
}

/// Own props for a [`filter_link`]
#[must_use]
pub fn filter_link_props(filter: VisibilityFilter) -> Props<TodoAction> {
    Props::new()
        .with("filter", json!(filter))
        .with_data("children", filter.label())
}

/// Footer link selecting the filter named by its own `filter` prop
pub fn filter_link()
-> ConnectedComponent<StateTree, TodoAction, impl Component<TodoAction, Output = View>> {
    connect(|state: &StateTree, own: &Props<TodoAction>| {
        let active = own.data("filter") == Some(&json!(current_filter(state)));
        Props::new().with_data("active", active)
    })
    .with_dispatch(|dispatch, own| {
        let dispatch = dispatch.clone();
        let filter = own.data_as::<VisibilityFilter>("filter");
        Props::new().with(
            "on_click",
            Callback::new(move |_| match &filter {
                Ok(filter) => dispatch
                    .dispatch(TodoAction::SetVisibilityFilter { filter: *filter })
                    .map(|_| ()),
                Err(error) => {
                    tracing::warn!(%error, "Filter link without a valid filter");
                    Ok(())
                },
            }),
        )
    })
    .wrap(link)
    .named("filter_link")
}

/// The add-todo form, receiving the store's dispatch function directly
pub fn add_todo(
    input: TextInput,
    ids: IdGenerator,
) -> ConnectedComponent<StateTree, TodoAction, AddTodoForm> {
    Connector::new()
        .wrap(AddTodoForm::new(input, ids))
        .named("add_todo")
}
