//! Todo example built on slicestore.
//!
//! The classic to-do list: a `todos` slice and a `visibility_filter` slice,
//! combined into one state tree; connected components deriving their props
//! from that tree; and a root view that re-renders after every dispatch.
//!
//! - [`types`]: `Todo`, `VisibilityFilter`, `TodoAction`, `IdGenerator`
//! - [`reducer`]: slice reducers and the root reducer
//! - [`selectors`]: visible todos, current filter
//! - [`components`]: presentation components producing a [`View`]
//! - [`connectors`]: those components bound to the store
//! - [`app`]: bootstrap
//!
//! # Quick Start
//!
//! ```no_run
//! use todo::{create, create_store};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = create_store()?;
//! let app = create(&store, |view: todo::View| println!("{view}"))?;
//!
//! app.add("Buy milk")?;
//! app.click("Buy milk")?;
//! app.click("Completed")?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod components;
pub mod connectors;
pub mod reducer;
pub mod selectors;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use app::{App, TodoStore, create, create_store};
pub use reducer::{TODOS, Todos, TodosReducer, VISIBILITY_FILTER, VisibilityFilterReducer, todo_app};
pub use selectors::{current_filter, select_visible_todos, visible_todos};
pub use types::{IdGenerator, Todo, TodoAction, TodoId, VisibilityFilter};
pub use view::View;
