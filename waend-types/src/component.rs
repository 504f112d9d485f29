//! The Component seam — named objects reachable through the proxy.

use crate::error::ComponentError;
use crate::event::{EventEmitter, Listener};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Seam ① — Components
///
/// Anything that wants its methods and events available by name implements
/// this trait and registers itself with an object proxy. Methods are looked
/// up by string at call time; most implementations back [`invoke`] with a
/// [`MethodTable`].
///
/// [`invoke`]: Component::invoke
pub trait Component: Send + Sync {
    /// Invoke `method` with `args` and return its result.
    fn invoke(&self, method: &str, args: Args) -> Result<Value, ComponentError>;

    /// The component's event emitter.
    fn events(&self) -> &EventEmitter;

    /// Subscribe to one of this component's events.
    fn on(&self, event: &str, listener: Listener) {
        self.events().on(event, listener);
    }

    /// Unsubscribe a listener previously passed to [`on`](Component::on).
    fn off(&self, event: &str, listener: &Listener) -> bool {
        self.events().off(event, listener)
    }
}

/// Positional arguments of a method call.
///
/// Converting a single JSON value wraps it in a one-element list; converting
/// a JSON array uses the array's elements as the list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(pub Vec<Value>);

impl Args {
    /// An empty argument list.
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the argument at `index`.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Deserialize the argument at `index`, failing with
    /// [`ComponentError::InvalidArgs`] when it is missing or mistyped.
    pub fn parse<T: DeserializeOwned>(&self, index: usize) -> Result<T, ComponentError> {
        let value = self
            .0
            .get(index)
            .ok_or_else(|| ComponentError::InvalidArgs(format!("missing argument {index}")))?;
        T::deserialize(value)
            .map_err(|e| ComponentError::InvalidArgs(format!("argument {index}: {e}")))
    }

    /// Consume into the underlying list.
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl From<Value> for Args {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(items),
            single => Self(vec![single]),
        }
    }
}

impl From<Vec<Value>> for Args {
    fn from(items: Vec<Value>) -> Self {
        Self(items)
    }
}

impl<const N: usize> From<[Value; N]> for Args {
    fn from(items: [Value; N]) -> Self {
        Self(items.into())
    }
}

impl From<&str> for Args {
    fn from(s: &str) -> Self {
        Self(vec![Value::String(s.to_owned())])
    }
}

/// A method entry in a [`MethodTable`].
pub type Method<T> = fn(&T, Args) -> Result<Value, ComponentError>;

/// Method-name lookup table for implementing [`Component::invoke`].
pub struct MethodTable<T> {
    methods: HashMap<&'static str, Method<T>>,
}

impl<T> MethodTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Add a method, builder style.
    #[must_use]
    pub fn with(mut self, name: &'static str, method: Method<T>) -> Self {
        self.methods.insert(name, method);
        self
    }

    /// Whether `name` is in the table.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Look up `name` and run it against `target`.
    pub fn invoke(&self, target: &T, name: &str, args: Args) -> Result<Value, ComponentError> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| ComponentError::MethodNotFound(name.to_owned()))?;
        method(target, args)
    }
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.methods.keys().collect();
        names.sort();
        f.debug_struct("MethodTable").field("methods", &names).finish()
    }
}
