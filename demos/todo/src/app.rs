//! Bootstrap: mount the connected components and compose the root view.
//!
//! Every binding renders into its own slot. A root listener, registered after
//! all bindings, composes the slots and commits the whole page to the render
//! target once per dispatch.

use crate::components::{TextInput, add_todo_form, footer};
use crate::connectors::{add_todo, filter_link, filter_link_props, visible_todo_list};
use crate::reducer::todo_app;
use crate::types::{IdGenerator, TodoAction, VisibilityFilter};
use crate::view::View;
use slicestore_connect::{Binding, Props, RenderTarget};
use slicestore_core::{CombinedReducer, ComposeError};
use slicestore_runtime::{Store, StoreConfig, StoreError, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// The todo store type
pub type TodoStore = Store<CombinedReducer<TodoAction>>;

/// A store running the todo root reducer
///
/// # Errors
///
/// Returns the composer's error if the root reducer cannot be assembled.
pub fn create_store() -> Result<TodoStore, ComposeError> {
    Ok(Store::with_config(
        todo_app()?,
        None,
        StoreConfig::default().with_name("todos"),
    ))
}

/// Latest output of every mounted binding
struct Slots {
    add_todo: View,
    todo_list: View,
    links: Vec<View>,
}

impl Slots {
    fn compose(&self) -> View {
        View::element("div")
            .child(self.add_todo.clone())
            .child(self.todo_list.clone())
            .child(footer(&self.links))
    }
}

/// The mounted todo application
pub struct App {
    store: TodoStore,
    input: TextInput,
    slots: Rc<RefCell<Slots>>,
    renders: Rc<Cell<usize>>,
    bindings: Vec<Binding<TodoAction>>,
    root: Subscription,
}

/// Mount the application against `store`, committing the root view to
/// `target` now and after every dispatch
///
/// # Errors
///
/// Returns [`StoreError::SubscribeWhileReducing`] if called from a reducer.
pub fn create<T>(store: &TodoStore, target: T) -> Result<App, StoreError>
where
    T: RenderTarget<View> + 'static,
{
    let input = TextInput::new();
    let slots = Rc::new(RefCell::new(Slots {
        add_todo: add_todo_form(None),
        todo_list: View::element("ul"),
        links: vec![View::text(""); VisibilityFilter::ALL.len()],
    }));

    let mut bindings = Vec::with_capacity(2 + VisibilityFilter::ALL.len());

    let slot = Rc::clone(&slots);
    bindings.push(add_todo(input.clone(), IdGenerator::new()).mount(
        store,
        Props::new(),
        move |view: View| slot.borrow_mut().add_todo = view,
    )?);

    let slot = Rc::clone(&slots);
    bindings.push(visible_todo_list().mount(store, Props::new(), move |view: View| {
        slot.borrow_mut().todo_list = view;
    })?);

    for (index, filter) in VisibilityFilter::ALL.into_iter().enumerate() {
        let slot = Rc::clone(&slots);
        bindings.push(filter_link().mount(
            store,
            filter_link_props(filter),
            move |view: View| {
                if let Some(link) = slot.borrow_mut().links.get_mut(index) {
                    *link = view;
                }
            },
        )?);
    }

    let renders = Rc::new(Cell::new(0));
    let target = Rc::new(RefCell::new(target));
    let commit = {
        let slots = Rc::clone(&slots);
        let renders = Rc::clone(&renders);
        move || {
            let view = slots.borrow().compose();
            match target.try_borrow_mut() {
                Ok(mut target) => {
                    target.commit(view);
                    renders.set(renders.get() + 1);
                },
                Err(_) => tracing::warn!("Root render target is busy (did it dispatch?), page dropped"),
            }
        }
    };

    commit();
    let root = store.subscribe(commit)?;

    tracing::info!(bindings = bindings.len(), "Todo app mounted");

    Ok(App {
        store: store.clone(),
        input,
        slots,
        renders,
        bindings,
        root,
    })
}

impl App {
    /// The page as last rendered
    #[must_use]
    pub fn view(&self) -> View {
        self.slots.borrow().compose()
    }

    /// The store this app is mounted on
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Number of root renders, including the one at mount
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.renders.get()
    }

    /// Type into the add-todo input
    pub fn type_text(&self, text: impl Into<String>) {
        self.input.set(text);
    }

    /// Current text of the add-todo input
    #[must_use]
    pub fn input_text(&self) -> String {
        self.input.read()
    }

    /// Click the element labelled `label`
    ///
    /// Returns `Ok(false)` if nothing clickable carries that label (an
    /// active filter link, for example).
    ///
    /// # Errors
    ///
    /// Returns the store's error from the dispatch the click triggered.
    pub fn click(&self, label: &str) -> Result<bool, StoreError> {
        let view = self.view();
        let Some(callback) = view.find_clickable(label) else {
            tracing::debug!(label, "Nothing clickable with this label");
            return Ok(false);
        };
        callback.call(serde_json::Value::Null)?;
        Ok(true)
    }

    /// Type `text` and press "Add Todo"
    ///
    /// # Errors
    ///
    /// Returns the store's error from the dispatch.
    pub fn add(&self, text: impl Into<String>) -> Result<bool, StoreError> {
        self.type_text(text);
        self.click("Add Todo")
    }

    /// Unmount every binding and stop rendering
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsubscribeWhileReducing`] if called from a
    /// reducer.
    pub fn unmount(&self) -> Result<(), StoreError> {
        for binding in &self.bindings {
            binding.unmount()?;
        }
        self.root.unsubscribe()?;
        tracing::info!("Todo app unmounted");
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(error) = self.root.unsubscribe() {
            tracing::warn!(%error, "Root listener left registered");
        }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store)
            .field("bindings", &self.bindings)
            .field("renders", &self.renders.get())
            .finish_non_exhaustive()
    }
}
