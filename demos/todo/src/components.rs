//! Presentation components.
//!
//! Pure functions of props producing a [`View`]. None of them knows about the
//! store; the connectors in [`crate::connectors`] supply their props.

use crate::types::{IdGenerator, Todo, TodoAction, TodoId};
use crate::view::View;
use serde::de::DeserializeOwned;
use slicestore_connect::{Callback, Component, DISPATCH_PROP, Props};
use std::cell::RefCell;
use std::rc::Rc;

/// Read a data prop, logging and falling back to the default when it is
/// missing or malformed
fn prop_or_default<T: DeserializeOwned + Default>(props: &Props<TodoAction>, key: &str) -> T {
    props.data_as(key).unwrap_or_else(|error| {
        tracing::warn!(%error, "Rendering with a default prop");
        T::default()
    })
}

/// One todo; completed todos are struck through
#[must_use]
pub fn todo_item(todo: &Todo, on_click: Option<Callback>) -> View {
    let decoration = if todo.completed {
        "line-through"
    } else {
        "none"
    };
    let item = View::element("li")
        .attr("style", format!("text-decoration: {decoration}"))
        .child(View::text(todo.text.clone()));

    match on_click {
        Some(callback) => item.on_click(callback),
        None => item,
    }
}

/// The todo list
///
/// Props: `todos` (array of todos), `on_todo_click` (callback taking an id).
#[must_use]
pub fn todo_list(props: &Props<TodoAction>) -> View {
    let todos: Vec<Todo> = prop_or_default(props, "todos");
    let on_todo_click = props.callback("on_todo_click").cloned();

    View::element("ul").children(todos.iter().map(|todo| {
        let on_click = on_todo_click.clone().map(|callback| {
            let id: TodoId = todo.id;
            Callback::new(move |_| callback.call(serde_json::json!(id)))
        });
        todo_item(todo, on_click)
    }))
}

/// A filter link; the active one is plain text
///
/// Props: `active` (bool), `children` (label), `on_click` (callback).
#[must_use]
pub fn link(props: &Props<TodoAction>) -> View {
    let label: String = prop_or_default(props, "children");

    if prop_or_default::<bool>(props, "active") {
        return View::element("span").child(View::text(label));
    }

    let anchor = View::element("a")
        .attr("href", "#")
        .child(View::text(label));
    match props.callback("on_click") {
        Some(callback) => anchor.on_click(callback.clone()),
        None => anchor,
    }
}

/// "Show: All Completed Active" with already rendered links
#[must_use]
pub fn footer(links: &[View]) -> View {
    let mut footer = View::element("p").child(View::text("Show:"));
    for link in links {
        footer = footer.child(View::text(" ")).child(link.clone());
    }
    footer
}

/// Input plus "Add Todo" button
#[must_use]
pub fn add_todo_form(on_submit: Option<Callback>) -> View {
    let button = View::element("button").child(View::text("Add Todo"));
    let button = match on_submit {
        Some(callback) => button.on_click(callback),
        None => button,
    };

    View::element("div")
        .child(View::element("input"))
        .child(button)
}

/// Text typed into the add-todo input
///
/// Owned by one mounted add-todo form; clones share the text.
#[derive(Clone, Debug, Default)]
pub struct TextInput {
    value: Rc<RefCell<String>>,
}

impl TextInput {
    /// An empty input
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text
    #[must_use]
    pub fn read(&self) -> String {
        self.value.borrow().clone()
    }

    /// Replace the text, as if the user typed it
    pub fn set(&self, text: impl Into<String>) {
        *self.value.borrow_mut() = text.into();
    }

    /// Empty the input
    pub fn clear(&self) {
        self.value.borrow_mut().clear();
    }
}

/// The add-todo form as a component
///
/// Expects the store's dispatch function under [`DISPATCH_PROP`]. Submitting
/// dispatches `ADD_TODO` with the input text and a fresh id, then clears the
/// input.
#[derive(Clone, Debug)]
pub struct AddTodoForm {
    input: TextInput,
    ids: IdGenerator,
}

impl AddTodoForm {
    /// A form reading `input` and numbering todos with `ids`
    #[must_use]
    pub const fn new(input: TextInput, ids: IdGenerator) -> Self {
        Self { input, ids }
    }
}

impl Component<TodoAction> for AddTodoForm {
    type Output = View;

    fn render(&self, props: &Props<TodoAction>) -> View {
        let on_submit = props.dispatch(DISPATCH_PROP).cloned().map(|dispatch| {
            let input = self.input.clone();
            let ids = self.ids.clone();
            Callback::new(move |_| {
                dispatch.dispatch(ids.add_todo(input.read()))?;
                input.clear();
                Ok(())
            })
        });
        add_todo_form(on_submit)
    }
}
