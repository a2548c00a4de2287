//! Props handed to presentation components.
//!
//! A [`Props`] value is an ordered mapping from prop name to [`PropValue`].
//! Plain data travels as `serde_json::Value`; behaviour travels as a
//! [`Callback`] or as the store's [`Dispatch`] handle itself.

use serde::de::DeserializeOwned;
use slicestore_runtime::{Dispatch, StoreError};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Prop name under which the default dispatch mapper injects the store's
/// dispatch function
pub const DISPATCH_PROP: &str = "dispatch";

/// Errors from reading typed data out of [`Props`]
#[derive(Error, Debug)]
pub enum PropError {
    /// No prop with that name
    #[error("Prop '{0}' is missing")]
    Missing(String),

    /// The prop exists but is not plain data
    #[error("Prop '{key}' is a {found}, expected data")]
    NotData {
        /// Prop name
        key: String,
        /// Kind of value actually stored
        found: &'static str,
    },

    /// The data could not be decoded into the requested type
    #[error("Prop '{key}' could not be decoded: {source}")]
    Decode {
        /// Prop name
        key: String,
        /// Underlying decode error
        #[source]
        source: serde_json::Error,
    },
}

/// A behaviour prop, e.g. `on_click`
///
/// The argument is whatever the presentation layer passes along (a todo id,
/// the text of an input, or `Value::Null`). Errors are the store's errors,
/// returned from the dispatch the callback performed.
#[derive(Clone)]
pub struct Callback {
    f: Rc<dyn Fn(serde_json::Value) -> Result<(), StoreError>>,
}

impl Callback {
    /// Wrap a closure
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(serde_json::Value) -> Result<(), StoreError> + 'static,
    {
        Self { f: Rc::new(f) }
    }

    /// Invoke the callback
    ///
    /// # Errors
    ///
    /// Returns whatever the wrapped closure returns, typically the error of
    /// the dispatch it performed.
    pub fn call(&self, argument: serde_json::Value) -> Result<(), StoreError> {
        (self.f)(argument)
    }

    /// Returns true if both callbacks wrap the same closure
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.f, &other.f)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

/// One prop value
pub enum PropValue<A> {
    /// Plain data
    Data(serde_json::Value),
    /// A behaviour prop
    Callback(Callback),
    /// The store's dispatch function
    Dispatch(Dispatch<A>),
}

impl<A> PropValue<A> {
    const fn kind(&self) -> &'static str {
        match self {
            Self::Data(_) => "data",
            Self::Callback(_) => "callback",
            Self::Dispatch(_) => "dispatch",
        }
    }
}

impl<A> Clone for PropValue<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Data(value) => Self::Data(value.clone()),
            Self::Callback(callback) => Self::Callback(callback.clone()),
            Self::Dispatch(dispatch) => Self::Dispatch(dispatch.clone()),
        }
    }
}

/// Data compares by value; callbacks and dispatch handles by identity.
impl<A> PartialEq for PropValue<A> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Callback(a), Self::Callback(b)) => a.ptr_eq(b),
            (Self::Dispatch(a), Self::Dispatch(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl<A> fmt::Debug for PropValue<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(value) => f.debug_tuple("Data").field(value).finish(),
            Self::Callback(callback) => f.debug_tuple("Callback").field(callback).finish(),
            Self::Dispatch(dispatch) => f.debug_tuple("Dispatch").field(dispatch).finish(),
        }
    }
}

impl<A> From<serde_json::Value> for PropValue<A> {
    fn from(value: serde_json::Value) -> Self {
        Self::Data(value)
    }
}

impl<A> From<Callback> for PropValue<A> {
    fn from(callback: Callback) -> Self {
        Self::Callback(callback)
    }
}

impl<A> From<Dispatch<A>> for PropValue<A> {
    fn from(dispatch: Dispatch<A>) -> Self {
        Self::Dispatch(dispatch)
    }
}

/// Ordered prop mapping
///
/// Keys keep the position of their first insertion. Inserting an existing
/// key replaces its value in place.
///
/// # Example
///
/// ```
/// use slicestore_connect::Props;
///
/// let own: Props<()> = Props::new().with_data("filter", "SHOW_ALL").with_data("label", "All");
/// let derived: Props<()> = Props::new().with_data("active", true).with_data("label", "Everything");
///
/// let merged = own.merge(derived);
/// assert_eq!(merged.keys().collect::<Vec<_>>(), vec!["filter", "label", "active"]);
/// assert_eq!(merged.data("label"), Some(&serde_json::json!("Everything")));
/// ```
pub struct Props<A> {
    entries: Vec<(String, PropValue<A>)>,
}

impl<A> Props<A> {
    /// Empty props
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builder form of [`Props::insert`]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue<A>>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add a plain data prop
    #[must_use]
    pub fn with_data(self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.with(key, PropValue::Data(value.into()))
    }

    /// Insert or replace a prop, returning the previous value
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue<A>>,
    ) -> Option<PropValue<A>> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            },
        }
    }

    /// Look up a prop
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue<A>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Look up a data prop
    #[must_use]
    pub fn data(&self, key: &str) -> Option<&serde_json::Value> {
        match self.get(key)? {
            PropValue::Data(value) => Some(value),
            _ => None,
        }
    }

    /// Decode a data prop into `T`
    ///
    /// # Errors
    ///
    /// - [`PropError::Missing`] if there is no such prop
    /// - [`PropError::NotData`] if the prop is a callback or dispatch handle
    /// - [`PropError::Decode`] if the data does not fit `T`
    pub fn data_as<T: DeserializeOwned>(&self, key: &str) -> Result<T, PropError> {
        match self.get(key) {
            None => Err(PropError::Missing(key.to_string())),
            Some(PropValue::Data(value)) => {
                serde_json::from_value(value.clone()).map_err(|source| PropError::Decode {
                    key: key.to_string(),
                    source,
                })
            },
            Some(other) => Err(PropError::NotData {
                key: key.to_string(),
                found: other.kind(),
            }),
        }
    }

    /// Look up a callback prop
    #[must_use]
    pub fn callback(&self, key: &str) -> Option<&Callback> {
        match self.get(key)? {
            PropValue::Callback(callback) => Some(callback),
            _ => None,
        }
    }

    /// Look up a dispatch prop
    #[must_use]
    pub fn dispatch(&self, key: &str) -> Option<&Dispatch<A>> {
        match self.get(key)? {
            PropValue::Dispatch(dispatch) => Some(dispatch),
            _ => None,
        }
    }

    /// Shallow merge; keys in `other` shadow keys in `self`
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
        self
    }

    /// Prop names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue<A>)> + '_ {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of props
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no props
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<A> Default for Props<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Props<A> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<A> PartialEq for Props<A> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<A> fmt::Debug for Props<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}
