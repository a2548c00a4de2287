//! # Slicestore Connect
//!
//! Binding layer between a [`Store`](slicestore_runtime::Store) and
//! presentation components.
//!
//! Presentation components are pure functions of [`Props`]. They never
//! subscribe to the store themselves; a [`ConnectedComponent`] does it for
//! them, recomputing props and rendering again after every dispatch.
//!
//! ## Example
//!
//! ```ignore
//! use slicestore_connect::{Props, connect};
//!
//! let filter_link = connect(|state: &StateTree, own: &Props<TodoAction>| {
//!     let active = own.data("filter") == Some(&json!(current_filter(state)));
//!     Props::new().with_data("active", active)
//! })
//! .with_dispatch(|dispatch, own| Props::new().with("on_click", set_filter(dispatch, own)))
//! .wrap(link);
//!
//! let binding = filter_link.mount(&store, Props::new().with_data("filter", "SHOW_ALL"), target)?;
//! store.dispatch(TodoAction::SetVisibilityFilter { filter: VisibilityFilter::ShowActive })?;
//! assert_eq!(binding.render_count(), 2);
//! ```

/// Component and render target seams
pub mod component;

/// `connect`, connected components and bindings
pub mod connector;

/// Props, prop values and callbacks
pub mod props;

pub use component::{Component, RenderTarget};
pub use connector::{Binding, ConnectedComponent, Connector, connect};
pub use props::{Callback, DISPATCH_PROP, PropError, PropValue, Props};
