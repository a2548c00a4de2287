//! Property tests for reducer composition
//!
//! Checks the algebraic guarantees the store relies on: unknown actions pass
//! slices through untouched, reduction is deterministic, and the combined
//! reducer agrees with each slice reducer applied on its own.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use slicestore_core::{
    Action, CombinedReducer, INIT_ACTION_TYPE, Reducer, SliceKey, StateTree, combine_reducers,
};
use std::sync::Arc;

#[derive(Clone, Debug)]
enum TallyAction {
    Init,
    Add(i64),
    Push(String),
    Clear,
    Noise,
}

impl Action for TallyAction {
    fn action_type(&self) -> &'static str {
        match self {
            Self::Init => INIT_ACTION_TYPE,
            Self::Add(_) => "ADD",
            Self::Push(_) => "PUSH",
            Self::Clear => "CLEAR",
            Self::Noise => "NOISE",
        }
    }

    fn init() -> Self {
        Self::Init
    }
}

const TOTAL: SliceKey<i64> = SliceKey::new("total");
const LOG: SliceKey<Vec<String>> = SliceKey::new("log");

struct TotalReducer;

impl Reducer for TotalReducer {
    type State = i64;
    type Action = TallyAction;

    fn initial_state(&self) -> Self::State {
        0
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        match action {
            TallyAction::Add(n) => Arc::new(state.wrapping_add(*n)),
            TallyAction::Clear => Arc::new(0),
            _ => Arc::clone(state),
        }
    }
}

struct LogReducer;

impl Reducer for LogReducer {
    type State = Vec<String>;
    type Action = TallyAction;

    fn initial_state(&self) -> Self::State {
        Vec::new()
    }

    fn reduce(&self, state: &Arc<Self::State>, action: &Self::Action) -> Arc<Self::State> {
        match action {
            TallyAction::Push(entry) => {
                let mut next = (**state).clone();
                next.push(entry.clone());
                Arc::new(next)
            },
            TallyAction::Clear => Arc::new(Vec::new()),
            _ => Arc::clone(state),
        }
    }
}

fn root() -> CombinedReducer<TallyAction> {
    combine_reducers()
        .slice(TOTAL, TotalReducer)
        .slice(LOG, LogReducer)
        .build()
        .unwrap()
}

fn action_strategy() -> impl Strategy<Value = TallyAction> {
    prop_oneof![
        any::<i64>().prop_map(TallyAction::Add),
        "[a-z]{0,8}".prop_map(TallyAction::Push),
        Just(TallyAction::Clear),
        Just(TallyAction::Noise),
    ]
}

fn tree_after(actions: &[TallyAction]) -> Arc<StateTree> {
    let root = root();
    let mut state = root.reduce(&Arc::new(StateTree::default()), &TallyAction::Init);
    for action in actions {
        state = root.reduce(&state, action);
    }
    state
}

proptest! {
    #[test]
    fn unknown_actions_pass_every_slice_through(history in prop::collection::vec(action_strategy(), 0..20)) {
        let state = tree_after(&history);

        let total = state.get(&TOTAL).unwrap();
        let log = state.get(&LOG).unwrap();

        prop_assert!(Arc::ptr_eq(&total, &TotalReducer.reduce(&total, &TallyAction::Noise)));
        prop_assert!(Arc::ptr_eq(&log, &LogReducer.reduce(&log, &TallyAction::Noise)));

        let next = root().reduce(&state, &TallyAction::Noise);
        prop_assert!(next.slice_ptr_eq(&state, "total"));
        prop_assert!(next.slice_ptr_eq(&state, "log"));
    }

    #[test]
    fn reduction_is_deterministic(
        history in prop::collection::vec(action_strategy(), 0..20),
        action in action_strategy(),
    ) {
        let state = tree_after(&history);
        let root = root();

        let first = root.reduce(&state, &action);
        let second = root.reduce(&state, &action);

        prop_assert_eq!(first.get(&TOTAL), second.get(&TOTAL));
        prop_assert_eq!(first.get(&LOG), second.get(&LOG));
    }

    #[test]
    fn combined_matches_each_slice_reducer(
        history in prop::collection::vec(action_strategy(), 0..20),
        action in action_strategy(),
    ) {
        let state = tree_after(&history);
        let next = root().reduce(&state, &action);

        let expected_total = TotalReducer.reduce(&state.get(&TOTAL).unwrap(), &action);
        let expected_log = LogReducer.reduce(&state.get(&LOG).unwrap(), &action);

        prop_assert_eq!(next.get(&TOTAL).unwrap(), expected_total);
        prop_assert_eq!(next.get(&LOG).unwrap(), expected_log);
    }
}
