//! `connect`: bind a presentation component to a store.
//!
//! A [`Connector`] holds two mapping functions. The state mapper derives
//! props from the current state and the component's own props; the dispatch
//! mapper derives behaviour props from the store's dispatch function. Merged
//! props are `own ⊕ state ⊕ dispatch`, later layers shadowing earlier ones.
//!
//! Mounting a [`ConnectedComponent`] subscribes to the store and renders once.
//! Every store notification recomputes the props from the current state and
//! renders again, whether or not they changed. The returned [`Binding`] owns
//! the subscription; unmounting (or dropping) it stops all further renders.

use crate::component::{Component, RenderTarget};
use crate::props::{DISPATCH_PROP, PropValue, Props};
use slicestore_core::{Action, Reducer};
use slicestore_runtime::{Dispatch, Store, StoreError, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type StateMapper<S, A> = Rc<dyn Fn(&S, &Props<A>) -> Props<A>>;
type DispatchMapper<A> = Rc<dyn Fn(&Dispatch<A>, &Props<A>) -> Props<A>>;

/// Start a connector from a state mapper
///
/// # Example
///
/// ```ignore
/// let visible_todo_list = connect(|state: &StateTree, _own| {
///     Props::new().with_data("todos", json!(visible_todos(state)))
/// })
/// .with_dispatch(|dispatch, _own| Props::new().with("on_todo_click", toggle(dispatch)))
/// .wrap(todo_list);
/// ```
pub fn connect<S, A, F>(state_mapper: F) -> Connector<S, A>
where
    F: Fn(&S, &Props<A>) -> Props<A> + 'static,
{
    Connector {
        state_mapper: Some(Rc::new(state_mapper)),
        dispatch_mapper: None,
    }
}

/// Mapping functions waiting for a component to wrap
pub struct Connector<S, A> {
    state_mapper: Option<StateMapper<S, A>>,
    dispatch_mapper: Option<DispatchMapper<A>>,
}

impl<S, A> Connector<S, A> {
    /// A connector without a state mapper
    ///
    /// The wrapped component receives its own props plus the dispatch props.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state_mapper: None,
            dispatch_mapper: None,
        }
    }

    /// Replace the default dispatch mapper
    ///
    /// Without one, the component receives the store's dispatch function
    /// under [`DISPATCH_PROP`].
    #[must_use]
    pub fn with_dispatch<F>(mut self, dispatch_mapper: F) -> Self
    where
        F: Fn(&Dispatch<A>, &Props<A>) -> Props<A> + 'static,
    {
        self.dispatch_mapper = Some(Rc::new(dispatch_mapper));
        self
    }

    /// Bind `component` to these mappers
    #[must_use]
    pub fn wrap<C: Component<A>>(self, component: C) -> ConnectedComponent<S, A, C> {
        ConnectedComponent {
            name: "component",
            state_mapper: self.state_mapper,
            dispatch_mapper: self.dispatch_mapper,
            component: Rc::new(component),
        }
    }
}

impl<S, A> Default for Connector<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A> fmt::Debug for Connector<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("state_mapper", &self.state_mapper.is_some())
            .field("dispatch_mapper", &self.dispatch_mapper.is_some())
            .finish()
    }
}

/// A component bound to its mapping functions, ready to mount
pub struct ConnectedComponent<S, A, C> {
    name: &'static str,
    state_mapper: Option<StateMapper<S, A>>,
    dispatch_mapper: Option<DispatchMapper<A>>,
    component: Rc<C>,
}

impl<S, A, C> ConnectedComponent<S, A, C>
where
    C: Component<A>,
{
    /// Label used in log output
    #[must_use]
    pub const fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// The label used in log output
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Merged props for one render: `own ⊕ state ⊕ dispatch`
    pub fn derive_props(&self, state: &S, dispatch: &Dispatch<A>, own_props: &Props<A>) -> Props<A> {
        let mut props = own_props.clone();

        if let Some(state_mapper) = &self.state_mapper {
            props = props.merge(state_mapper(state, own_props));
        }

        let dispatch_props = match &self.dispatch_mapper {
            Some(dispatch_mapper) => dispatch_mapper(dispatch, own_props),
            None => Props::new().with(DISPATCH_PROP, PropValue::Dispatch(dispatch.clone())),
        };
        props.merge(dispatch_props)
    }

    /// Render once against `state` without subscribing
    pub fn render(&self, state: &S, dispatch: &Dispatch<A>, own_props: &Props<A>) -> C::Output {
        self.component
            .render(&self.derive_props(state, dispatch, own_props))
    }

    /// Subscribe to `store`, render once, and keep rendering into `target`
    /// after every dispatch until the binding is unmounted
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SubscribeWhileReducing`] if called from a reducer.
    pub fn mount<R, T>(
        &self,
        store: &Store<R>,
        own_props: Props<A>,
        target: T,
    ) -> Result<Binding<A>, StoreError>
    where
        R: Reducer<State = S, Action = A> + 'static,
        S: 'static,
        A: Action,
        C: 'static,
        T: RenderTarget<C::Output> + 'static,
    {
        let connected = self.clone();
        let weak_store = store.downgrade();
        let dispatch = store.dispatcher();
        let target = RefCell::new(target);

        let update = move |own_props: &Props<A>| -> Result<Props<A>, StoreError> {
            let store = weak_store.upgrade().ok_or(StoreError::StoreDropped)?;
            let props = connected.derive_props(&store.get_state(), &dispatch, own_props);
            let output = connected.component.render(&props);

            match target.try_borrow_mut() {
                Ok(mut target) => target.commit(output),
                Err(_) => tracing::warn!(
                    component = connected.name,
                    "Render target is busy (did it dispatch?), output dropped"
                ),
            }
            Ok(props)
        };

        let inner = Rc::new(BindingInner {
            name: self.name,
            own_props: RefCell::new(own_props),
            props: RefCell::new(Props::new()),
            render_count: Cell::new(0),
            mounted: Cell::new(true),
            subscription: RefCell::new(None),
            update: Box::new(update),
        });

        let weak: Weak<BindingInner<A>> = Rc::downgrade(&inner);
        let subscription = store.subscribe(move || {
            if let Some(binding) = weak.upgrade() {
                if let Err(error) = binding.refresh() {
                    tracing::warn!(component = binding.name, %error, "Binding refresh failed");
                }
            }
        })?;
        *inner.subscription.borrow_mut() = Some(subscription);

        tracing::debug!(component = self.name, "Binding mounted");

        let binding = Binding { inner };
        binding.inner.refresh()?;
        Ok(binding)
    }
}

impl<S, A, C> Clone for ConnectedComponent<S, A, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            state_mapper: self.state_mapper.clone(),
            dispatch_mapper: self.dispatch_mapper.clone(),
            component: Rc::clone(&self.component),
        }
    }
}

impl<S, A, C> fmt::Debug for ConnectedComponent<S, A, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectedComponent")
            .field("name", &self.name)
            .field("state_mapper", &self.state_mapper.is_some())
            .field("dispatch_mapper", &self.dispatch_mapper.is_some())
            .finish_non_exhaustive()
    }
}

type Update<A> = Box<dyn Fn(&Props<A>) -> Result<Props<A>, StoreError>>;

struct BindingInner<A> {
    name: &'static str,
    own_props: RefCell<Props<A>>,
    props: RefCell<Props<A>>,
    render_count: Cell<usize>,
    mounted: Cell<bool>,
    subscription: RefCell<Option<Subscription>>,
    update: Update<A>,
}

impl<A> BindingInner<A> {
    fn refresh(&self) -> Result<(), StoreError> {
        if !self.mounted.get() {
            return Ok(());
        }

        let own_props = self.own_props.borrow().clone();
        let props = (self.update)(&own_props)?;
        *self.props.borrow_mut() = props;
        self.render_count.set(self.render_count.get() + 1);

        tracing::trace!(
            component = self.name,
            renders = self.render_count.get(),
            "Binding rendered"
        );
        Ok(())
    }
}

/// A mounted connected component
///
/// Dropping the binding unmounts it.
pub struct Binding<A> {
    inner: Rc<BindingInner<A>>,
}

impl<A> Binding<A> {
    /// Props used for the latest render
    #[must_use]
    pub fn props(&self) -> Props<A> {
        self.inner.props.borrow().clone()
    }

    /// Number of renders so far, including the one at mount
    #[must_use]
    pub fn render_count(&self) -> usize {
        self.inner.render_count.get()
    }

    /// Returns true until the binding is unmounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// Replace the component's own props and render again
    ///
    /// An unmounted binding keeps the new props but does not render.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store is gone.
    pub fn set_own_props(&self, own_props: Props<A>) -> Result<(), StoreError> {
        *self.inner.own_props.borrow_mut() = own_props;
        self.inner.refresh()
    }

    /// Unsubscribe from the store
    ///
    /// Returns `Ok(false)` if the binding was already unmounted. If this runs
    /// during a notification pass the binding is not rendered again, even
    /// when it was still pending in that pass.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsubscribeWhileReducing`] if called from a
    /// reducer; the binding stays mounted.
    pub fn unmount(&self) -> Result<bool, StoreError> {
        if !self.inner.mounted.get() {
            return Ok(false);
        }

        if let Some(subscription) = self.inner.subscription.borrow().as_ref() {
            subscription.unsubscribe()?;
        }
        self.inner.mounted.set(false);

        tracing::debug!(
            component = self.inner.name,
            renders = self.inner.render_count.get(),
            "Binding unmounted"
        );
        Ok(true)
    }
}

impl<A> Drop for Binding<A> {
    fn drop(&mut self) {
        if let Err(error) = self.unmount() {
            self.inner.mounted.set(false);
            tracing::warn!(component = self.inner.name, %error, "Binding dropped without unsubscribing");
        }
    }
}

impl<A> fmt::Debug for Binding<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("name", &self.inner.name)
            .field("mounted", &self.inner.mounted.get())
            .field("render_count", &self.inner.render_count.get())
            .finish_non_exhaustive()
    }
}
