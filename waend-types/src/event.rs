//! Observer-style event emitter shared by components.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A callback subscribed to an event. Identity (for [`EventEmitter::off`])
/// is the `Arc` allocation, so keep a clone of the listener you subscribed.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&Value) + Send + Sync + 'static,
{
    Arc::new(f)
}

fn same_listener(a: &Listener, b: &Listener) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

struct Slot {
    listener: Listener,
    once: bool,
}

/// Per-event ordered listener lists.
///
/// Listeners run in subscription order. The internal lock is released before
/// any listener runs, so a listener may subscribe, unsubscribe, or emit on
/// the same emitter.
#[derive(Default)]
pub struct EventEmitter {
    slots: Mutex<HashMap<String, Vec<Slot>>>,
}

impl EventEmitter {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Vec<Slot>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe `listener` to `event`.
    pub fn on(&self, event: &str, listener: Listener) {
        self.subscribe(event, listener, false);
    }

    /// Subscribe `listener` to the next emission of `event` only.
    pub fn once(&self, event: &str, listener: Listener) {
        self.subscribe(event, listener, true);
    }

    fn subscribe(&self, event: &str, listener: Listener, once: bool) {
        self.slots()
            .entry(event.to_owned())
            .or_default()
            .push(Slot { listener, once });
    }

    /// Remove every subscription of `listener` to `event`.
    /// Returns whether anything was removed.
    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        let mut slots = self.slots();
        let Some(list) = slots.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|slot| !same_listener(&slot.listener, listener));
        let removed = list.len() != before;
        if list.is_empty() {
            slots.remove(event);
        }
        removed
    }

    /// Call every listener of `event` with `payload`.
    /// Returns how many listeners were notified.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let targets: Vec<Listener> = {
            let mut slots = self.slots();
            let Some(list) = slots.get_mut(event) else {
                return 0;
            };
            let targets: Vec<Listener> =
                list.iter().map(|slot| Arc::clone(&slot.listener)).collect();
            list.retain(|slot| !slot.once);
            if list.is_empty() {
                slots.remove(event);
            }
            targets
        };

        for target in &targets {
            target(payload);
        }
        targets.len()
    }

    /// Number of listeners currently subscribed to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.slots().get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots();
        let mut map = f.debug_map();
        for (event, list) in slots.iter() {
            map.entry(event, &list.len());
        }
        map.finish()
    }
}
