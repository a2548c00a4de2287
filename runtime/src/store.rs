//! The Store - single source of truth for one state tree.
//!
//! A store owns exactly one current state, one root reducer fixed for its
//! lifetime, and an ordered list of listeners. It is a cheap `Clone` handle;
//! every clone sees the same state.
//!
//! Ordering rules:
//!
//! - State is replaced before any listener runs, so listeners always observe
//!   the post-dispatch state through [`Store::get_state`].
//! - Listeners run in registration order. The list is snapshotted when the
//!   notification pass starts: subscribing or unsubscribing during a pass takes
//!   effect from the next dispatch.
//! - Dispatching from a reducer fails with [`StoreError::ReentrantDispatch`].
//!   Dispatching from a listener is allowed and runs a full nested cycle.

use crate::metrics::{
    ACTIONS_DISPATCHED, LISTENER_FAILURES, LISTENERS_NOTIFIED, REENTRANT_DISPATCHES,
};
use crate::{ListenerFailurePolicy, StoreConfig, StoreError};
use slicestore_core::{Action, INIT_ACTION_TYPE, Reducer};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};
use std::sync::Arc;

type Listener = Rc<dyn Fn()>;

/// Identifies one listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Listener bookkeeping, shared by every store regardless of reducer type.
trait ListenerRegistry {
    fn remove_listener(&self, id: ListenerId) -> Result<bool, StoreError>;

    fn has_listener(&self, id: ListenerId) -> bool;
}

struct Inner<R: Reducer> {
    reducer: R,
    state: RefCell<Arc<R::State>>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener_id: Cell<u64>,
    is_reducing: Cell<bool>,
    config: StoreConfig,
}

impl<R: Reducer> ListenerRegistry for Inner<R> {
    fn remove_listener(&self, id: ListenerId) -> Result<bool, StoreError> {
        if self.is_reducing.get() {
            return Err(StoreError::UnsubscribeWhileReducing);
        }

        let mut listeners = self.listeners.borrow_mut();
        let Some(index) = listeners.iter().position(|(existing, _)| *existing == id) else {
            return Ok(false);
        };
        listeners.remove(index);

        tracing::debug!(
            store = %self.config.name,
            listener = %id,
            remaining = listeners.len(),
            "Listener unsubscribed"
        );
        Ok(true)
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == id)
    }
}

/// Marks the reducer as running; cleared on drop, including during a panic.
struct ReducingGuard<'a>(&'a Cell<bool>);

impl<'a> ReducingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ReducingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The Store - owner of state, reducer and subscribers
///
/// # Type Parameters
///
/// - `R`: The root reducer (often a `CombinedReducer`)
///
/// # Example
///
/// ```ignore
/// let store = Store::new(root_reducer);
///
/// store.dispatch(TodoAction::ToggleTodo { id: 0 })?;
/// let todos = store.get_state().get(&TODOS);
/// ```
pub struct Store<R: Reducer> {
    inner: Rc<Inner<R>>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer + 'static,
    R::Action: Action,
{
    /// Create a store whose slices start from their reducers' defaults
    #[must_use]
    pub fn new(reducer: R) -> Self {
        Self::with_config(reducer, None, StoreConfig::default())
    }

    /// Create a store from previously captured state
    ///
    /// Slices missing from `state` still settle to their defaults.
    #[must_use]
    pub fn with_preloaded_state(reducer: R, state: R::State) -> Self {
        Self::with_config(reducer, Some(state), StoreConfig::default())
    }

    /// Create a new Store with custom configuration
    ///
    /// Initialization reduces the reserved init action once against
    /// `preloaded` (or the reducer's initial state) before the store is handed
    /// out. No listener can observe that step.
    #[must_use]
    pub fn with_config(reducer: R, preloaded: Option<R::State>, config: StoreConfig) -> Self {
        let seed = Arc::new(preloaded.unwrap_or_else(|| reducer.initial_state()));
        let state = reducer.reduce(&seed, &R::Action::init());

        tracing::debug!(store = %config.name, "Store initialized");

        Self {
            inner: Rc::new(Inner {
                reducer,
                state: RefCell::new(state),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
                is_reducing: Cell::new(false),
                config,
            }),
        }
    }

    /// The current state
    ///
    /// The returned snapshot is never modified; later dispatches replace the
    /// store's state instead of editing it.
    #[must_use]
    pub fn get_state(&self) -> Arc<R::State> {
        Arc::clone(&self.inner.state.borrow())
    }

    /// Read the current state through a closure
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        f(&self.get_state())
    }

    /// Send an action through the reducer and notify every listener
    ///
    /// 1. Runs the root reducer against the current state
    /// 2. Replaces the current state with the result
    /// 3. Calls every listener registered when this dispatch started, in
    ///    registration order, with no arguments
    /// 4. Returns the action
    ///
    /// # Errors
    ///
    /// - [`StoreError::ReservedActionType`] if `action` is the init action
    /// - [`StoreError::ReentrantDispatch`] if called from inside a reducer
    /// - [`StoreError::ListenerPanicked`] if a listener panicked under
    ///   [`ListenerFailurePolicy::Isolate`]; the state was still replaced and
    ///   the remaining listeners were still notified
    ///
    /// # Panics
    ///
    /// A panicking reducer is a defect of that reducer; the panic propagates
    /// and the state is left unchanged. Under [`ListenerFailurePolicy::Propagate`]
    /// a panicking listener propagates as well.
    #[tracing::instrument(
        skip(self, action),
        name = "store_dispatch",
        fields(store = %self.inner.config.name, action_type = action.action_type())
    )]
    pub fn dispatch(&self, action: R::Action) -> Result<R::Action, StoreError> {
        if action.is_init() {
            return Err(StoreError::ReservedActionType(INIT_ACTION_TYPE));
        }

        if self.inner.is_reducing.get() {
            tracing::error!("Dispatch attempted from inside a reducer");
            metrics::counter!(REENTRANT_DISPATCHES, "store" => self.inner.config.name.clone())
                .increment(1);
            return Err(StoreError::ReentrantDispatch {
                action_type: action.action_type(),
            });
        }

        {
            let _reducing = ReducingGuard::enter(&self.inner.is_reducing);
            let current = self.get_state();
            let next = self.inner.reducer.reduce(&current, &action);
            *self.inner.state.borrow_mut() = next;
        }

        tracing::trace!("State replaced");
        metrics::counter!(ACTIONS_DISPATCHED, "store" => self.inner.config.name.clone())
            .increment(1);

        let snapshot: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        self.notify(&snapshot)?;
        Ok(action)
    }

    fn notify(&self, listeners: &[Listener]) -> Result<(), StoreError> {
        let name = &self.inner.config.name;
        metrics::counter!(LISTENERS_NOTIFIED, "store" => name.clone())
            .increment(listeners.len() as u64);

        if self.inner.config.listener_failure_policy == ListenerFailurePolicy::Propagate {
            for listener in listeners {
                listener();
            }
            return Ok(());
        }

        let mut failed = 0;
        for (index, listener) in listeners.iter().enumerate() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                failed += 1;
                tracing::error!(
                    listener_index = index,
                    message = panic_message(payload.as_ref()),
                    "Listener panicked during notification"
                );
                metrics::counter!(LISTENER_FAILURES, "store" => name.clone()).increment(1);
            }
        }

        if failed > 0 {
            return Err(StoreError::ListenerPanicked {
                failed,
                notified: listeners.len(),
            });
        }
        Ok(())
    }

    /// Register a listener, called with no arguments after every dispatch
    ///
    /// The same closure may be registered more than once; each registration
    /// is notified and revoked independently. A listener added during a
    /// notification pass is first called on the next dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SubscribeWhileReducing`] if called from a reducer.
    pub fn subscribe<F>(&self, listener: F) -> Result<Subscription, StoreError>
    where
        F: Fn() + 'static,
    {
        if self.inner.is_reducing.get() {
            return Err(StoreError::SubscribeWhileReducing);
        }

        let id = ListenerId(self.inner.next_listener_id.get());
        self.inner.next_listener_id.set(id.0 + 1);

        let mut listeners = self.inner.listeners.borrow_mut();
        listeners.push((id, Rc::new(listener)));

        tracing::debug!(
            store = %self.inner.config.name,
            listener = %id,
            listeners = listeners.len(),
            "Listener subscribed"
        );

        let inner: Rc<dyn ListenerRegistry> = Rc::clone(&self.inner) as Rc<dyn ListenerRegistry>;
        Ok(Subscription {
            id,
            registry: Rc::downgrade(&inner),
        })
    }

    /// Number of registered listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// A cloneable dispatch function bound to this store
    ///
    /// The handle does not keep the store alive.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatch<R::Action> {
        let store = self.downgrade();
        Dispatch {
            send: Rc::new(move |action| match store.upgrade() {
                Some(store) => store.dispatch(action),
                None => Err(StoreError::StoreDropped),
            }),
        }
    }

    /// A handle that does not keep the store alive
    ///
    /// Listeners stored inside the store should capture this instead of a
    /// `Store` clone.
    #[must_use]
    pub fn downgrade(&self) -> WeakStore<R> {
        WeakStore {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The root reducer
    #[must_use]
    pub fn reducer(&self) -> &R {
        &self.inner.reducer
    }

    /// The store configuration
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Returns true if both handles refer to the same store
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<R: Reducer> fmt::Debug for Store<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.config.name)
            .field("listeners", &self.inner.listeners.borrow().len())
            .field("is_reducing", &self.inner.is_reducing.get())
            .finish_non_exhaustive()
    }
}

/// Non-owning handle to a [`Store`]
pub struct WeakStore<R: Reducer> {
    inner: Weak<Inner<R>>,
}

impl<R: Reducer> WeakStore<R> {
    /// The store, if it is still alive
    #[must_use]
    pub fn upgrade(&self) -> Option<Store<R>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

impl<R: Reducer> Clone for WeakStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<R: Reducer> fmt::Debug for WeakStore<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStore")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

/// Revocation handle for one listener registration
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "dropping a Subscription does not unsubscribe; keep it to be able to unsubscribe"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<dyn ListenerRegistry>,
}

impl Subscription {
    /// Remove this registration
    ///
    /// Returns `Ok(false)` if it was already removed or the store is gone.
    /// A notification pass already in progress still calls the listener.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsubscribeWhileReducing`] if called from a reducer.
    pub fn unsubscribe(&self) -> Result<bool, StoreError> {
        match self.registry.upgrade() {
            Some(registry) => registry.remove_listener(self.id),
            None => Ok(false),
        }
    }

    /// Returns true while the listener is registered
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.has_listener(self.id))
    }

    /// The registration id
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// A cloneable dispatch function
///
/// Obtained from [`Store::dispatcher`]. This is what the connector injects
/// into presentation props.
pub struct Dispatch<A> {
    send: Rc<dyn Fn(A) -> Result<A, StoreError>>,
}

impl<A> Dispatch<A> {
    /// Dispatch an action to the store this handle came from
    ///
    /// # Errors
    ///
    /// Same as [`Store::dispatch`], plus [`StoreError::StoreDropped`].
    pub fn dispatch(&self, action: A) -> Result<A, StoreError> {
        (self.send)(action)
    }

    /// Returns true if both handles are the same dispatch function
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.send, &other.send)
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            send: Rc::clone(&self.send),
        }
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic
mod tests {
    use super::*;
    use slicestore_core::reducer_fn;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Init,
        Increment,
        Decrement,
        NoOp,
    }

    impl Action for TestAction {
        fn action_type(&self) -> &'static str {
            match self {
                Self::Init => INIT_ACTION_TYPE,
                Self::Increment => "INCREMENT",
                Self::Decrement => "DECREMENT",
                Self::NoOp => "NO_OP",
            }
        }

        fn init() -> Self {
            Self::Init
        }
    }

    fn counter() -> impl Reducer<State = i32, Action = TestAction> {
        reducer_fn(|| 0, |state: &Arc<i32>, action: &TestAction| match action {
            TestAction::Increment => Arc::new(**state + 1),
            TestAction::Decrement => Arc::new(**state - 1),
            TestAction::Init | TestAction::NoOp => Arc::clone(state),
        })
    }

    #[test]
    fn test_store_creation() {
        let store = Store::new(counter());
        assert_eq!(*store.get_state(), 0);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_preloaded_state() {
        let store = Store::with_preloaded_state(counter(), 41);
        let _ = store.dispatch(TestAction::Increment);
        assert_eq!(*store.get_state(), 42);
    }

    #[test]
    fn test_dispatch_returns_action() {
        let store = Store::new(counter());
        let returned = store.dispatch(TestAction::Increment).unwrap();
        assert_eq!(returned, TestAction::Increment);
        assert_eq!(store.state(|s| *s), 1);
    }

    #[test]
    fn test_multiple_actions() {
        let store = Store::new(counter());

        let _ = store.dispatch(TestAction::Increment);
        let _ = store.dispatch(TestAction::Increment);
        let _ = store.dispatch(TestAction::Decrement);

        assert_eq!(*store.get_state(), 1);
    }

    #[test]
    fn test_retained_snapshot_is_never_modified() {
        let store = Store::new(counter());
        let before = store.get_state();

        let _ = store.dispatch(TestAction::Increment);

        assert_eq!(*before, 0);
        assert_eq!(*store.get_state(), 1);
    }

    #[test]
    fn test_noop_keeps_state_identity() {
        let store = Store::new(counter());
        let before = store.get_state();

        let _ = store.dispatch(TestAction::NoOp);

        assert!(Arc::ptr_eq(&before, &store.get_state()));
    }

    #[test]
    fn test_init_action_is_reserved() {
        let store = Store::new(counter());
        let result = store.dispatch(TestAction::Init);
        assert_eq!(
            result,
            Err(StoreError::ReservedActionType(INIT_ACTION_TYPE))
        );
    }

    #[test]
    fn test_store_clone_shares_state() {
        let store1 = Store::new(counter());
        let store2 = store1.clone();

        let _ = store1.dispatch(TestAction::Increment);
        assert_eq!(*store2.get_state(), 1);
        assert!(store1.ptr_eq(&store2));
    }

    #[test]
    fn test_listener_sees_post_dispatch_state() {
        let store = Store::new(counter());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let weak = store.downgrade();
        let log = Rc::clone(&seen);
        let _subscription = store
            .subscribe(move || {
                if let Some(store) = weak.upgrade() {
                    log.borrow_mut().push(*store.get_state());
                }
            })
            .unwrap();

        let _ = store.dispatch(TestAction::Increment);
        let _ = store.dispatch(TestAction::Increment);

        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let store = Store::new(counter());
        let subscription = store.subscribe(|| {}).unwrap();

        assert!(subscription.is_active());
        assert_eq!(subscription.unsubscribe(), Ok(true));
        assert_eq!(subscription.unsubscribe(), Ok(false));
        assert!(!subscription.is_active());
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_store() {
        let store = Store::new(counter());
        let subscription = store.subscribe(|| {}).unwrap();
        drop(store);

        assert!(!subscription.is_active());
        assert_eq!(subscription.unsubscribe(), Ok(false));
    }

    #[test]
    fn test_dispatcher_after_drop() {
        let store = Store::new(counter());
        let dispatch = store.dispatcher();

        assert_eq!(dispatch.dispatch(TestAction::Increment), Ok(TestAction::Increment));
        assert_eq!(*store.get_state(), 1);

        drop(store);
        assert_eq!(
            dispatch.dispatch(TestAction::Increment),
            Err(StoreError::StoreDropped)
        );
    }

    #[test]
    fn test_panic_message_extraction() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "<non-string panic payload>");
    }
}
