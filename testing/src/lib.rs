//! # Slicestore Testing
//!
//! Testing utilities and helpers for slicestore.
//!
//! This crate provides:
//! - [`ReducerTest`]: Given-When-Then harness for reducers
//! - [`assertions`]: identity and structural-sharing assertions
//! - [`ListenerProbe`]: records listener calls across a store's notification passes
//! - [`RenderRecorder`]: collects every output a bound component renders
//! - [`init_test_tracing`]: log output for failing tests
//!
//! ## Example
//!
//! ```ignore
//! use slicestore_testing::ListenerProbe;
//! use slicestore_runtime::Store;
//!
//! #[test]
//! fn test_notification_order() {
//!     let store = Store::new(root_reducer());
//!     let probe = ListenerProbe::new();
//!
//!     let _a = probe.subscribe(&store, "A").unwrap();
//!     let _b = probe.subscribe(&store, "B").unwrap();
//!
//!     store.dispatch(TodoAction::ToggleTodo { id: 0 }).unwrap();
//!     assert_eq!(probe.calls(), vec!["A", "B"]);
//! }
//! ```


pub use reducer_test::{ReducerTest, assertions};

/// Recorders for listeners and rendered output
pub mod probes {
    use slicestore_core::{Action, Reducer};
    use slicestore_runtime::{Store, StoreError, Subscription};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records which listeners were called, in order
    ///
    /// # Example
    ///
    /// ```
    /// use slicestore_testing::ListenerProbe;
    ///
    /// let probe = ListenerProbe::new();
    /// let a = probe.listener("A");
    /// let b = probe.listener("B");
    ///
    /// b();
    /// a();
    /// assert_eq!(probe.calls(), vec!["B", "A"]);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct ListenerProbe {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ListenerProbe {
        /// Create an empty probe
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A listener that records `label` each time it is called
        #[must_use]
        pub fn listener(&self, label: impl Into<String>) -> Box<dyn Fn()> {
            let calls = Rc::clone(&self.calls);
            let label = label.into();
            Box::new(move || calls.borrow_mut().push(label.clone()))
        }

        /// Subscribe a recording listener to `store`
        ///
        /// # Errors
        ///
        /// Returns the store's error if subscribing is not allowed right now.
        pub fn subscribe<R>(
            &self,
            store: &Store<R>,
            label: impl Into<String>,
        ) -> Result<Subscription, StoreError>
        where
            R: Reducer + 'static,
            R::Action: Action,
        {
            store.subscribe(self.listener(label))
        }

        /// Labels recorded so far, in call order
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        /// Number of times `label` was recorded
        #[must_use]
        pub fn count(&self, label: &str) -> usize {
            self.calls.borrow().iter().filter(|call| *call == label).count()
        }

        /// Forget everything recorded so far
        pub fn clear(&self) {
            self.calls.borrow_mut().clear();
        }

        /// Record a label directly, e.g. from inside a custom listener
        pub fn record(&self, label: impl Into<String>) {
            self.calls.borrow_mut().push(label.into());
        }
    }

    /// Collects every output committed to a render target
    ///
    /// [`RenderRecorder::target`] returns a boxed `FnMut(O)`, which is a render
    /// target for connected components.
    #[derive(Debug)]
    pub struct RenderRecorder<O> {
        renders: Rc<RefCell<Vec<O>>>,
    }

    impl<O> RenderRecorder<O> {
        /// Create an empty recorder
        #[must_use]
        pub fn new() -> Self {
            Self {
                renders: Rc::new(RefCell::new(Vec::new())),
            }
        }

        /// A sink that appends every rendered output to this recorder
        #[must_use]
        pub fn target(&self) -> Box<dyn FnMut(O)>
        where
            O: 'static,
        {
            let renders = Rc::clone(&self.renders);
            Box::new(move |output| renders.borrow_mut().push(output))
        }

        /// Number of renders so far
        #[must_use]
        pub fn len(&self) -> usize {
            self.renders.borrow().len()
        }

        /// Returns true if nothing was rendered
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.renders.borrow().is_empty()
        }
    }

    impl<O: Clone> RenderRecorder<O> {
        /// Every output rendered so far
        #[must_use]
        pub fn renders(&self) -> Vec<O> {
            self.renders.borrow().clone()
        }

        /// The most recent output
        #[must_use]
        pub fn last(&self) -> Option<O> {
            self.renders.borrow().last().cloned()
        }
    }

    impl<O> Default for RenderRecorder<O> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<O> Clone for RenderRecorder<O> {
        fn clone(&self) -> Self {
            Self {
                renders: Rc::clone(&self.renders),
            }
        }
    }
}

pub use probes::{ListenerProbe, RenderRecorder};

/// Install a test-friendly tracing subscriber
///
/// Output goes through the test harness capture. Honors `RUST_LOG`; safe to
/// call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
