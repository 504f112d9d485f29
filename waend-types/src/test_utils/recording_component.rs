//! RecordingComponent — accepts any method call and remembers it.

use crate::component::{Args, Component};
use crate::error::ComponentError;
use crate::event::EventEmitter;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;

/// A recorded method call for inspection in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Method name as invoked.
    pub method: String,
    /// Arguments as received.
    pub args: Vec<Value>,
}

/// A component that records every call and returns its arguments as a JSON
/// array. Methods marked with [`failing`](RecordingComponent::failing) are
/// recorded and then fail with [`ComponentError::Failed`].
pub struct RecordingComponent {
    failing: HashSet<String>,
    calls: Mutex<Vec<RecordedCall>>,
    events: EventEmitter,
}

impl RecordingComponent {
    /// Create a component where every method succeeds.
    pub fn new() -> Self {
        Self {
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            events: EventEmitter::new(),
        }
    }

    /// Make `method` fail, builder style.
    #[must_use]
    pub fn failing(mut self, method: &str) -> Self {
        self.failing.insert(method.to_owned());
        self
    }

    /// Return a snapshot of all recorded calls.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls to one method.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }
}

impl Default for RecordingComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RecordingComponent {
    fn invoke(&self, method: &str, args: Args) -> Result<Value, ComponentError> {
        let args = args.into_vec();
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_owned(),
            args: args.clone(),
        });
        if self.failing.contains(method) {
            return Err(ComponentError::Failed(format!("{method} always fails")));
        }
        Ok(Value::Array(args))
    }

    fn events(&self) -> &EventEmitter {
        &self.events
    }
}
