//! Typed slice keys and the immutable state tree.
//!
//! A [`StateTree`] maps slice names to slice states. Slice values are stored
//! type-erased behind `Arc<dyn Any + Send + Sync>` and read back through a typed
//! [`SliceKey`], so one tree can hold heterogeneous slices while callers keep
//! compile-time types at the edges.
//!
//! Trees are never edited after construction. A new tree is assembled for every
//! reduction and slices that did not change are the same `Arc` in both trees.

use smallvec::SmallVec;
use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// A type-erased slice value.
pub(crate) type SliceValue = Arc<dyn Any + Send + Sync>;

/// Ordered slice storage. Most applications have a handful of slices.
pub(crate) type Slices = SmallVec<[(&'static str, SliceValue); 4]>;

/// Errors from typed state tree reads
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The tree has no slice with this name
    #[error("State tree has no slice named '{0}'")]
    MissingSlice(&'static str),

    /// The slice exists but holds a different type
    #[error("Slice '{slice}' does not hold a value of type {expected}")]
    SliceTypeMismatch {
        /// Name of the slice
        slice: &'static str,
        /// Type the caller asked for
        expected: &'static str,
    },
}

/// A typed, permanent slice name.
///
/// # Example
///
/// ```
/// use slicestore_core::{SliceKey, StateTree};
///
/// const FILTER: SliceKey<String> = SliceKey::new("visibilityFilter");
///
/// let tree = StateTree::builder().insert(FILTER, "SHOW_ALL".to_string()).build();
/// assert_eq!(tree.get_ref(&FILTER).map(String::as_str), Some("SHOW_ALL"));
/// ```
pub struct SliceKey<S> {
    name: &'static str,
    _marker: PhantomData<fn() -> S>,
}

impl<S> SliceKey<S> {
    /// Create a key for the slice called `name`
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// The slice name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<S> Clone for SliceKey<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SliceKey<S> {}

impl<S> fmt::Debug for SliceKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceKey")
            .field("name", &self.name)
            .field("type", &type_name::<S>())
            .finish()
    }
}

/// Immutable mapping from slice name to slice state.
///
/// Cloning is cheap (one `Arc` bump) and a clone can be retained safely: the
/// tree it points at is never modified.
#[derive(Clone, Default)]
pub struct StateTree {
    slices: Arc<Slices>,
}

impl StateTree {
    /// Start building a tree, typically to preload a store
    #[must_use]
    pub fn builder() -> StateTreeBuilder {
        StateTreeBuilder::default()
    }

    pub(crate) fn from_slices(slices: Slices) -> Self {
        Self {
            slices: Arc::new(slices),
        }
    }

    pub(crate) fn raw(&self, name: &str) -> Option<&SliceValue> {
        self.slices
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Shared handle to a slice, if present with the expected type
    #[must_use]
    pub fn get<S: Send + Sync + 'static>(&self, key: &SliceKey<S>) -> Option<Arc<S>> {
        self.try_get(key).ok()
    }

    /// Borrow a slice, if present with the expected type
    #[must_use]
    pub fn get_ref<S: Send + Sync + 'static>(&self, key: &SliceKey<S>) -> Option<&S> {
        self.raw(key.name())
            .and_then(|value| value.downcast_ref::<S>())
    }

    /// Shared handle to a slice
    ///
    /// # Errors
    ///
    /// - [`StateError::MissingSlice`] if no slice has this name
    /// - [`StateError::SliceTypeMismatch`] if the slice holds another type
    pub fn try_get<S: Send + Sync + 'static>(&self, key: &SliceKey<S>) -> Result<Arc<S>, StateError> {
        let value = self
            .raw(key.name())
            .ok_or(StateError::MissingSlice(key.name()))?;

        Arc::clone(value)
            .downcast::<S>()
            .map_err(|_| StateError::SliceTypeMismatch {
                slice: key.name(),
                expected: type_name::<S>(),
            })
    }

    /// Returns true if the tree has a slice with this name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    /// Slice names in composition order
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.iter().map(|(key, _)| *key)
    }

    /// Number of slices
    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Returns true if the tree has no slices
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Returns true if both handles point at the same tree
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slices, &other.slices)
    }

    /// Returns true if the named slice is the same shared value in both trees
    ///
    /// A slice missing from either tree is never shared.
    #[must_use]
    pub fn slice_ptr_eq(&self, other: &Self, name: &str) -> bool {
        match (self.raw(name), other.raw(name)) {
            (Some(left), Some(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTree")
            .field("slices", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for a [`StateTree`].
///
/// Inserting a name twice replaces the earlier value but keeps its position.
#[derive(Default)]
pub struct StateTreeBuilder {
    slices: Slices,
}

impl StateTreeBuilder {
    /// Add a slice value
    #[must_use]
    pub fn insert<S: Send + Sync + 'static>(self, key: SliceKey<S>, value: S) -> Self {
        self.insert_arc(key, Arc::new(value))
    }

    /// Add a slice value that is already shared
    #[must_use]
    pub fn insert_arc<S: Send + Sync + 'static>(mut self, key: SliceKey<S>, value: Arc<S>) -> Self {
        let value: SliceValue = value;
        match self.slices.iter_mut().find(|(name, _)| *name == key.name()) {
            Some(entry) => entry.1 = value,
            None => self.slices.push((key.name(), value)),
        }
        self
    }

    /// Finish the tree
    #[must_use]
    pub fn build(self) -> StateTree {
        StateTree::from_slices(self.slices)
    }
}

impl fmt::Debug for StateTreeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTreeBuilder")
            .field(
                "slices",
                &self.slices.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
            )
            .finish()
    }
}
