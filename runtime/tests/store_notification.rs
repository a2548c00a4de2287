//! Integration tests for dispatch ordering, subscriptions and re-entrancy
//!
//! These tests drive a real combined reducer through the Store and observe
//! the notification pass from the outside.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use slicestore_core::{
    Action, CombinedReducer, INIT_ACTION_TYPE, Reducer, SliceKey, StateTree, combine_reducers,
    reducer_fn,
};
use slicestore_runtime::{Dispatch, ListenerFailurePolicy, Store, StoreConfig, StoreError};
use slicestore_testing::{ListenerProbe, init_test_tracing};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
enum CounterAction {
    Init,
    Increment,
    Rename(String),
    Ping,
}

impl Action for CounterAction {
    fn action_type(&self) -> &'static str {
        match self {
            Self::Init => INIT_ACTION_TYPE,
            Self::Increment => "INCREMENT",
            Self::Rename(_) => "RENAME",
            Self::Ping => "PING",
        }
    }

    fn init() -> Self {
        Self::Init
    }
}

const COUNT: SliceKey<u32> = SliceKey::new("count");
const NAME: SliceKey<String> = SliceKey::new("name");

fn root() -> CombinedReducer<CounterAction> {
    combine_reducers()
        .slice(
            COUNT,
            reducer_fn(|| 0, |state: &Arc<u32>, action: &CounterAction| match action {
                CounterAction::Increment => Arc::new(**state + 1),
                _ => Arc::clone(state),
            }),
        )
        .slice(
            NAME,
            reducer_fn(String::new, |state: &Arc<String>, action: &CounterAction| {
                match action {
                    CounterAction::Rename(name) => Arc::new(name.clone()),
                    _ => Arc::clone(state),
                }
            }),
        )
        .build()
        .unwrap()
}

fn count(store: &Store<CombinedReducer<CounterAction>>) -> u32 {
    store.get_state().get(&COUNT).map_or(0, |count| *count)
}

#[test]
fn test_create_settles_every_slice_to_its_default() {
    let store = Store::new(root());
    let state = store.get_state();

    assert_eq!(state.keys().collect::<Vec<_>>(), vec!["count", "name"]);
    assert_eq!(state.get(&COUNT).as_deref(), Some(&0));
    assert_eq!(state.get_ref(&NAME).map(String::as_str), Some(""));
}

#[test]
fn test_create_from_partial_preloaded_state() {
    let preloaded = StateTree::builder().insert(COUNT, 10).build();
    let store = Store::with_preloaded_state(root(), preloaded);

    assert_eq!(count(&store), 10);
    assert_eq!(
        store.get_state().get_ref(&NAME).map(String::as_str),
        Some("")
    );
}

#[test]
fn test_store_keeps_its_config_and_reducer() {
    let config = StoreConfig::new("counter", ListenerFailurePolicy::Propagate);
    let store = Store::with_config(root(), None, config);

    assert_eq!(store.config().name, "counter");
    assert_eq!(
        store.config().listener_failure_policy,
        ListenerFailurePolicy::Propagate
    );
    assert_eq!(
        store.reducer().initial_state().keys().collect::<Vec<_>>(),
        vec!["count", "name"]
    );
}

#[test]
fn test_listeners_called_in_registration_order_exactly_once() {
    let store = Store::new(root());
    let probe = ListenerProbe::new();

    let _a = probe.subscribe(&store, "A").unwrap();
    let _b = probe.subscribe(&store, "B").unwrap();
    let _c = probe.subscribe(&store, "C").unwrap();

    store.dispatch(CounterAction::Increment).unwrap();

    assert_eq!(probe.calls(), vec!["A", "B", "C"]);
}

#[test]
fn test_duplicate_registrations_are_independent() {
    let store = Store::new(root());
    let probe = ListenerProbe::new();

    let first = probe.subscribe(&store, "A").unwrap();
    let second = probe.subscribe(&store, "A").unwrap();
    assert_ne!(first.id(), second.id());

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.count("A"), 2);

    first.unsubscribe().unwrap();
    probe.clear();

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.count("A"), 1);
}

#[test]
fn test_self_unsubscribe_during_notification() {
    let store = Store::new(root());
    let probe = ListenerProbe::new();

    let _a = probe.subscribe(&store, "A").unwrap();

    let slot: Rc<RefCell<Option<slicestore_runtime::Subscription>>> = Rc::new(RefCell::new(None));
    let b_slot = Rc::clone(&slot);
    let b_probe = probe.clone();
    let b = store
        .subscribe(move || {
            b_probe.record("B");
            if let Some(subscription) = b_slot.borrow().as_ref() {
                subscription.unsubscribe().unwrap();
            }
        })
        .unwrap();
    *slot.borrow_mut() = Some(b);

    let _c = probe.subscribe(&store, "C").unwrap();

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.calls(), vec!["A", "B", "C"]);

    probe.clear();
    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.calls(), vec!["A", "C"]);
}

#[test]
fn test_unsubscribing_a_later_listener_takes_effect_next_dispatch() {
    let store = Store::new(root());
    let probe = ListenerProbe::new();

    let slot: Rc<RefCell<Option<slicestore_runtime::Subscription>>> = Rc::new(RefCell::new(None));
    let a_slot = Rc::clone(&slot);
    let a_probe = probe.clone();
    let _a = store
        .subscribe(move || {
            a_probe.record("A");
            if let Some(c) = a_slot.borrow().as_ref() {
                let _ = c.unsubscribe();
            }
        })
        .unwrap();
    let _b = probe.subscribe(&store, "B").unwrap();
    *slot.borrow_mut() = Some(probe.subscribe(&store, "C").unwrap());

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.calls(), vec!["A", "B", "C"]);

    probe.clear();
    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.calls(), vec!["A", "B"]);
}

#[test]
fn test_subscribing_during_notification_waits_for_next_dispatch() {
    let store = Store::new(root());
    let probe = ListenerProbe::new();
    let weak = store.downgrade();
    let added = Rc::new(Cell::new(false));

    let late_probe = probe.clone();
    let flag = Rc::clone(&added);
    let _a = store
        .subscribe(move || {
            late_probe.record("A");
            if !flag.get() {
                flag.set(true);
                if let Some(store) = weak.upgrade() {
                    // Kept registered for the rest of the test
                    let _late = late_probe.subscribe(&store, "late").unwrap();
                }
            }
        })
        .unwrap();

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.calls(), vec!["A"]);

    probe.clear();
    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(probe.calls(), vec!["A", "late"]);
}

#[test]
fn test_listeners_observe_post_dispatch_state() {
    let store = Store::new(root());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let weak = store.downgrade();
    let log = Rc::clone(&seen);
    let _subscription = store
        .subscribe(move || {
            if let Some(store) = weak.upgrade() {
                log.borrow_mut().push(count(&store));
            }
        })
        .unwrap();

    store.dispatch(CounterAction::Increment).unwrap();
    store.dispatch(CounterAction::Ping).unwrap();
    store.dispatch(CounterAction::Increment).unwrap();

    assert_eq!(*seen.borrow(), vec![1, 1, 2]);
}

#[test]
fn test_unrelated_slice_keeps_identity_across_dispatch() {
    let store = Store::new(root());
    let before = store.get_state();

    store.dispatch(CounterAction::Increment).unwrap();
    let after = store.get_state();

    assert!(!before.ptr_eq(&after));
    assert!(before.slice_ptr_eq(&after, "name"));
    assert!(!before.slice_ptr_eq(&after, "count"));
}

#[test]
fn test_same_action_from_same_state_is_deterministic() {
    let first = Store::new(root());
    let second = Store::new(root());

    first.dispatch(CounterAction::Rename("Ada".into())).unwrap();
    second.dispatch(CounterAction::Rename("Ada".into())).unwrap();

    assert_eq!(first.get_state().get(&NAME), second.get_state().get(&NAME));
    assert_eq!(count(&first), count(&second));
}

/// A reducer holding a dispatch handle to its own store
struct DispatchingReducer {
    dispatch: Rc<RefCell<Option<Dispatch<CounterAction>>>>,
    outcome: Rc<RefCell<Option<Result<CounterAction, StoreError>>>>,
}

impl Reducer for DispatchingReducer {
    type State = u32;
    type Action = CounterAction;

    fn initial_state(&self) -> Self::State {
        0
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        if *action == CounterAction::Increment {
            if let Some(dispatch) = self.dispatch.borrow().as_ref() {
                *self.outcome.borrow_mut() = Some(dispatch.dispatch(CounterAction::Ping));
            }
            return Arc::new(**state + 1);
        }
        Arc::clone(state)
    }
}

#[test]
fn test_dispatch_from_reducer_is_rejected() {
    init_test_tracing();

    let dispatch = Rc::new(RefCell::new(None));
    let outcome = Rc::new(RefCell::new(None));
    let store = Store::new(DispatchingReducer {
        dispatch: Rc::clone(&dispatch),
        outcome: Rc::clone(&outcome),
    });
    *dispatch.borrow_mut() = Some(store.dispatcher());

    store.dispatch(CounterAction::Increment).unwrap();

    assert_eq!(
        *outcome.borrow(),
        Some(Err(StoreError::ReentrantDispatch {
            action_type: "PING"
        }))
    );
    assert_eq!(*store.get_state(), 1);

    // The store is usable again once the reducer returned
    store.dispatch(CounterAction::Ping).unwrap();
}

#[test]
fn test_subscribe_from_reducer_is_rejected() {
    type Slot = Rc<RefCell<Option<slicestore_runtime::WeakStore<Box<dyn Reducer<State = u32, Action = CounterAction>>>>>>;

    let slot: Slot = Rc::new(RefCell::new(None));
    let outcome = Rc::new(RefCell::new(None));

    let reducer_slot = Rc::clone(&slot);
    let reducer_outcome = Rc::clone(&outcome);
    let reducer: Box<dyn Reducer<State = u32, Action = CounterAction>> = Box::new(reducer_fn(
        || 0,
        move |state: &Arc<u32>, action: &CounterAction| {
            if *action == CounterAction::Increment {
                if let Some(store) = reducer_slot.borrow().as_ref().and_then(|weak| weak.upgrade()) {
                    *reducer_outcome.borrow_mut() = Some(store.subscribe(|| {}).map(|_| ()));
                }
            }
            Arc::clone(state)
        },
    ));

    let store = Store::new(reducer);
    *slot.borrow_mut() = Some(store.downgrade());

    store.dispatch(CounterAction::Increment).unwrap();

    assert_eq!(*outcome.borrow(), Some(Err(StoreError::SubscribeWhileReducing)));
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn test_dispatch_from_listener_runs_nested_cycle() {
    let store = Store::new(root());
    let probe = ListenerProbe::new();
    let dispatch = store.dispatcher();

    let chain_probe = probe.clone();
    let weak = store.downgrade();
    let _a = store
        .subscribe(move || {
            let Some(store) = weak.upgrade() else { return };
            chain_probe.record(format!("A:{}", count(&store)));
            if count(&store) == 1 {
                dispatch.dispatch(CounterAction::Increment).unwrap();
            }
        })
        .unwrap();

    store.dispatch(CounterAction::Increment).unwrap();

    assert_eq!(probe.calls(), vec!["A:1", "A:2"]);
    assert_eq!(count(&store), 2);
}

#[test]
fn test_panicking_listener_is_isolated_and_reported() {
    init_test_tracing();

    let store = Store::new(root());
    let probe = ListenerProbe::new();

    let _a = probe.subscribe(&store, "A").unwrap();
    let _boom = store
        .subscribe(|| panic!("listener failure under test"))
        .unwrap();
    let _c = probe.subscribe(&store, "C").unwrap();

    let result = store.dispatch(CounterAction::Increment);

    assert_eq!(
        result,
        Err(StoreError::ListenerPanicked {
            failed: 1,
            notified: 3
        })
    );
    assert_eq!(probe.calls(), vec!["A", "C"]);
    assert_eq!(count(&store), 1);
}

#[test]
#[should_panic(expected = "listener failure under test")]
fn test_propagate_policy_lets_listener_panic_unwind() {
    let config = StoreConfig::default()
        .with_name("propagating")
        .with_listener_failure_policy(ListenerFailurePolicy::Propagate);
    let store = Store::with_config(root(), None, config);

    let _boom = store
        .subscribe(|| panic!("listener failure under test"))
        .unwrap();

    let _ = store.dispatch(CounterAction::Increment);
}

#[test]
fn test_panicking_reducer_leaves_state_and_store_usable() {
    let reducer = reducer_fn(|| 0_u32, |state: &Arc<u32>, action: &CounterAction| match action {
        CounterAction::Rename(name) if name == "explode" => panic!("reducer defect under test"),
        CounterAction::Increment => Arc::new(**state + 1),
        _ => Arc::clone(state),
    });
    let store = Store::new(reducer);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        store.dispatch(CounterAction::Rename("explode".into()))
    }));
    assert!(outcome.is_err());
    assert_eq!(*store.get_state(), 0);

    store.dispatch(CounterAction::Increment).unwrap();
    assert_eq!(*store.get_state(), 1);
}
