//! Dynamic values carried by distributions, spec fields and trial records.
//!
//! [`Value`] is the type-erased representation of anything a spec can hold:
//! scalars, ordered sequences, fixed-arity tuples, string-keyed mappings and
//! named function handles. Sequences and tuples are distinct variants so the
//! distinction survives a trip through JSON.
//!
//! # Example
//!
//! ```
//! use trialspec::{Callable, Mapping, Value};
//!
//! let square = Callable::new("square", |args: &[Value]| {
//!     let x = args[0].as_f64().unwrap_or_default();
//!     Value::Float(x * x)
//! });
//!
//! let mut fit_params: Mapping = Mapping::new();
//! fit_params.insert("loss", square.clone());
//! fit_params.insert("shape", Value::Tuple(vec![Value::Int(3), Value::Int(4)]));
//!
//! assert_eq!(square.call(&[Value::Float(3.0)]), Value::Float(9.0));
//! assert_eq!(fit_params.keys().collect::<Vec<_>>(), ["loss", "shape"]);
//! ```

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};

/// A dynamically typed value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered, variable-length sequence.
    List(Vec<Value>),
    /// An ordered, fixed-arity tuple.
    Tuple(Vec<Value>),
    /// A string-keyed mapping that remembers insertion order.
    Map(Mapping),
    /// A named function handle.
    Callable(Callable),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean, if this is a [`Value::Bool`].
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is a [`Value::Int`].
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `f64` for both [`Value::Float`] and [`Value::Int`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string slice, if this is a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements of a [`Value::List`] or [`Value::Tuple`].
    #[must_use]
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mapping, if this is a [`Value::Map`].
    #[must_use]
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the callable, if this is a [`Value::Callable`].
    #[must_use]
    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Self::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// A short name for the variant, used in diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "map",
            Self::Callable(_) => "callable",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Mapping> for Value {
    fn from(v: Mapping) -> Self {
        Self::Map(v)
    }
}

impl From<Callable> for Value {
    fn from(v: Callable) -> Self {
        Self::Callable(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A string-keyed map that preserves insertion order.
///
/// Re-inserting an existing key replaces its value without moving it.
/// Equality ignores order, matching the semantics of a key-value mapping.
#[derive(Clone)]
pub struct Mapping<V = Value> {
    entries: Vec<(String, V)>,
}

impl<V> Mapping<V> {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts `value` under `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<V>) -> Option<V> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(core::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> Default for Mapping<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for Mapping<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V: PartialEq> PartialEq for Mapping<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Mapping<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V> IntoIterator for Mapping<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

type CallableFn = dyn Fn(&[Value]) -> Value + Send + Sync;

/// A named, opaque function handle.
///
/// The name is the callable's identity: two callables compare equal when
/// their names match, and the name is all that is written when a callable
/// is serialized. Re-hydration goes through a caller-supplied [`Callables`]
/// table.
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    func: Arc<CallableFn>,
}

impl Callable {
    /// Wraps `func` under the given name.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    /// The declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the wrapped function.
    #[must_use]
    pub fn call(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callable").field(&self.name).finish()
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A lookup table from callable name to [`Callable`].
///
/// Decoding never discovers functions on its own: every callable referenced
/// by a serialized document must be present in the table handed to the
/// decoder.
///
/// ```
/// use trialspec::{Callable, Callables, Value};
///
/// let table: Callables = [
///     Callable::new("fit", |_: &[Value]| Value::Null),
///     Callable::new("predict", |_: &[Value]| Value::Null),
/// ]
/// .into_iter()
/// .collect();
///
/// assert!(table.resolve("fit").is_ok());
/// assert!(table.resolve("train").is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Callables {
    by_name: HashMap<String, Callable>,
}

impl Callables {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a callable under its own name, returning any callable it displaced.
    pub fn insert(&mut self, callable: Callable) -> Option<Callable> {
        self.by_name.insert(callable.name().to_owned(), callable)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.by_name.get(name)
    }

    /// Looks up `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCallableName`] if the name is not in the table.
    pub fn resolve(&self, name: &str) -> Result<Callable> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownCallableName(name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl FromIterator<Callable> for Callables {
    fn from_iter<I: IntoIterator<Item = Callable>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Extend<Callable> for Callables {
    fn extend<I: IntoIterator<Item = Callable>>(&mut self, iter: I) {
        for callable in iter {
            self.insert(callable);
        }
    }
}
