#![deny(missing_docs)]
//! Named component registry with deferred dispatch.
//!
//! [`ObjectProxy`] maps symbolic names to live components so any part of an
//! application can call a method on, or listen to, a component it holds no
//! reference to. When the name is not registered yet, the call or
//! subscription is queued as a [`Command`] and replayed, in order, the moment
//! the name is registered.
//!
//! The proxy holds weak references. A component whose last strong reference
//! is dropped disappears from the registry on the next lookup and its name
//! can be registered again.

use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use waend_types::{Args, Component, ComponentName, Listener, ProxyError};

/// Receives the return value of a delegated call.
pub type Reply = Box<dyn FnOnce(Value) + Send>;

/// Box a closure as a [`Reply`].
pub fn reply<F>(f: F) -> Reply
where
    F: FnOnce(Value) + Send + 'static,
{
    Box::new(f)
}

/// An operation waiting for its target name to be registered.
pub enum Command {
    /// A deferred method call.
    Call {
        /// Method to invoke.
        method: String,
        /// Arguments to invoke it with.
        args: Args,
        /// Receives the method's return value on success.
        reply: Option<Reply>,
    },
    /// A deferred event subscription.
    Subscribe {
        /// Event to subscribe to.
        event: String,
        /// Listener to attach.
        listener: Listener,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Call {
                method,
                args,
                reply,
            } => f
                .debug_struct("Call")
                .field("method", method)
                .field("args", args)
                .field("reply", &reply.is_some())
                .finish(),
            Command::Subscribe { event, .. } => {
                f.debug_struct("Subscribe").field("event", event).finish()
            }
        }
    }
}

/// How many commands are queued for a name, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingCounts {
    /// Deferred method calls.
    pub calls: usize,
    /// Deferred subscriptions.
    pub subscriptions: usize,
}

#[derive(Default)]
struct Registry {
    objects: HashMap<ComponentName, Weak<dyn Component>>,
    pending: HashMap<ComponentName, VecDeque<Command>>,
    /// Names whose queue is still being drained by `register`. Commands for
    /// these names are queued even though the name is live.
    replaying: HashSet<ComponentName>,
}

impl Registry {
    /// Resolve a live component, pruning the entry if it has been dropped.
    fn live(&mut self, name: &str) -> Option<Arc<dyn Component>> {
        match self.objects.get(name).map(Weak::upgrade) {
            None => None,
            Some(Some(target)) => Some(target),
            Some(None) => {
                self.objects.remove(name);
                tracing::debug!(component = name, "waend.proxy.pruned");
                None
            }
        }
    }

    /// Like [`live`](Registry::live), but `None` while `name` is replaying,
    /// so new commands line up behind the queued ones.
    fn dispatchable(&mut self, name: &str) -> Option<Arc<dyn Component>> {
        if self.replaying.contains(name) {
            return None;
        }
        self.live(name)
    }

    fn enqueue(&mut self, name: &str, command: Command) {
        self.pending
            .entry(ComponentName::new(name))
            .or_default()
            .push_back(command);
    }

    /// Take the next command to replay for `name`: the oldest queued call,
    /// or the oldest queued subscription once no calls are left. Clears the
    /// replay mark when the queue is empty.
    fn next_replay(&mut self, name: &ComponentName) -> Option<Command> {
        let next = self.pending.get_mut(name).and_then(|queue| {
            match queue
                .iter()
                .position(|command| matches!(command, Command::Call { .. }))
            {
                Some(index) => queue.remove(index),
                None => queue.pop_front(),
            }
        });
        if next.is_none() {
            self.pending.remove(name);
            self.replaying.remove(name);
        }
        next
    }
}

/// Registry of named components plus per-name queues of deferred commands.
///
/// Construct one and share it (`Arc<ObjectProxy>`) with every component that
/// needs to reach others by name. The internal lock is never held while a
/// component method, listener, or reply runs, so all of them may call back
/// into the proxy.
#[derive(Default)]
pub struct ObjectProxy {
    registry: Mutex<Registry>,
}

impl ObjectProxy {
    /// Create an empty proxy.
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `component` under `name`.
    ///
    /// The proxy keeps a weak reference; the caller owns the component.
    /// Fails with [`ProxyError::AlreadyRegistered`] if a live component
    /// already holds the name, leaving that binding untouched. On success,
    /// every call queued for `name` runs in the order it was delegated, then
    /// every queued subscription is attached in the order it was made.
    ///
    /// Until that queue is drained, calls and subscriptions for `name` made
    /// from any thread, including from inside a replayed method, are queued
    /// behind it rather than run ahead of it.
    pub fn register<C>(
        &self,
        name: impl Into<ComponentName>,
        component: &Arc<C>,
    ) -> Result<(), ProxyError>
    where
        C: Component + 'static,
    {
        let target: Arc<dyn Component> = Arc::clone(component) as Arc<dyn Component>;
        self.register_dyn(name, &target)
    }

    /// [`register`](ObjectProxy::register) for an already type-erased component.
    pub fn register_dyn(
        &self,
        name: impl Into<ComponentName>,
        component: &Arc<dyn Component>,
    ) -> Result<(), ProxyError> {
        let name = name.into();
        let queued = {
            let mut registry = self.registry();
            if registry.live(name.as_str()).is_some() {
                tracing::warn!(component = %name, "waend.proxy.register.duplicate");
                return Err(ProxyError::AlreadyRegistered(name.to_string()));
            }
            registry
                .objects
                .insert(name.clone(), Arc::downgrade(component));
            let queued = registry.pending.get(&name).map_or(0, VecDeque::len);
            if queued > 0 {
                registry.replaying.insert(name.clone());
            }
            queued
        };

        tracing::debug!(component = %name, queued, "waend.proxy.register");

        if queued > 0 {
            self.replay(&name, component);
        }
        Ok(())
    }

    /// Drain the queue of `name` one command at a time. The lock is taken
    /// only to pop; commands run without it.
    fn replay(&self, name: &ComponentName, target: &Arc<dyn Component>) {
        loop {
            let Some(command) = self.registry().next_replay(name) else {
                break;
            };
            match command {
                Command::Call {
                    method,
                    args,
                    reply,
                } => {
                    tracing::debug!(
                        component = %name,
                        method = %method,
                        "waend.proxy.replay.call"
                    );
                    run(name.as_str(), target, &method, args, reply);
                }
                Command::Subscribe { event, listener } => {
                    tracing::debug!(
                        component = %name,
                        event = %event,
                        "waend.proxy.replay.on"
                    );
                    target.on(&event, listener);
                }
            }
        }
    }

    /// Call `method` on the component named `name`, discarding its result.
    ///
    /// Same as [`delegate_with`](ObjectProxy::delegate_with) without a reply.
    pub fn delegate(&self, name: &str, method: &str, args: impl Into<Args>) -> bool {
        self.delegate_with(name, method, args, None)
    }

    /// Call `method` on the component named `name` and hand its return value
    /// to `reply`.
    ///
    /// Returns `true` if the call ran now, `false` if it was queued because
    /// `name` is not registered or its queue is still replaying. A failing
    /// method is logged and its reply is skipped; the call still counts as
    /// having run.
    pub fn delegate_with(
        &self,
        name: &str,
        method: &str,
        args: impl Into<Args>,
        reply: Option<Reply>,
    ) -> bool {
        let args = args.into();
        let target = {
            let mut registry = self.registry();
            match registry.dispatchable(name) {
                Some(target) => target,
                None => {
                    tracing::debug!(component = name, method, "waend.proxy.delegate.pending");
                    registry.enqueue(
                        name,
                        Command::Call {
                            method: method.to_owned(),
                            args,
                            reply,
                        },
                    );
                    return false;
                }
            }
        };

        tracing::trace!(component = name, method, "waend.proxy.delegate");
        run(name, &target, method, args, reply);
        true
    }

    /// Call `method` on the component named `name` right now and return its
    /// result. Nothing is queued: an unregistered name is an error.
    pub fn call(
        &self,
        name: &str,
        method: &str,
        args: impl Into<Args>,
    ) -> Result<Value, ProxyError> {
        let target = self
            .get(name)
            .ok_or_else(|| ProxyError::NotRegistered(name.to_owned()))?;
        target
            .invoke(method, args.into())
            .map_err(|source| ProxyError::Dispatch {
                component: name.to_owned(),
                method: method.to_owned(),
                source,
            })
    }

    /// Subscribe `listener` to `event` on the component named `name`.
    ///
    /// Returns `true` if attached now, `false` if queued until `name` is
    /// registered and its earlier queued commands have replayed.
    pub fn on(&self, name: &str, event: &str, listener: Listener) -> bool {
        let target = {
            let mut registry = self.registry();
            match registry.dispatchable(name) {
                Some(target) => target,
                None => {
                    tracing::debug!(component = name, event, "waend.proxy.on.pending");
                    registry.enqueue(
                        name,
                        Command::Subscribe {
                            event: event.to_owned(),
                            listener,
                        },
                    );
                    return false;
                }
            }
        };
        target.on(event, listener);
        true
    }

    /// Unsubscribe `listener` from `event` on the component named `name`.
    ///
    /// Does nothing for an unregistered name; unsubscriptions are not
    /// queued. Returns whether a subscription was removed.
    pub fn off(&self, name: &str, event: &str, listener: &Listener) -> bool {
        match self.get(name) {
            Some(target) => target.off(event, listener),
            None => {
                tracing::debug!(component = name, event, "waend.proxy.off.unregistered");
                false
            }
        }
    }

    /// The live component registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.registry().live(name)
    }

    /// Whether a live component is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all live components, sorted.
    pub fn names(&self) -> Vec<ComponentName> {
        let registry = self.registry();
        let mut names: Vec<_> = registry
            .objects
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Commands queued for `name`.
    pub fn pending(&self, name: &str) -> PendingCounts {
        let registry = self.registry();
        let mut counts = PendingCounts::default();
        for command in registry.pending.get(name).into_iter().flatten() {
            match command {
                Command::Call { .. } => counts.calls += 1,
                Command::Subscribe { .. } => counts.subscriptions += 1,
            }
        }
        counts
    }
}

impl fmt::Debug for ObjectProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry();
        f.debug_struct("ObjectProxy")
            .field("registered", &registry.objects.len())
            .field("pending", &registry.pending.len())
            .finish()
    }
}

fn run(
    name: &str,
    target: &Arc<dyn Component>,
    method: &str,
    args: Args,
    reply: Option<Reply>,
) {
    match target.invoke(method, args) {
        Ok(value) => {
            if let Some(reply) = reply {
                reply(value);
            }
        }
        Err(error) => {
            tracing::error!(
                component = name,
                method,
                error = %error,
                "waend.proxy.delegate.failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waend_types::test_utils::RecordingComponent;

    #[test]
    fn pending_counts_split_by_kind() {
        let proxy = ObjectProxy::new();
        proxy.delegate("map", "zoom", serde_json::json!(3));
        proxy.delegate("map", "pan", serde_json::json!([1, 2]));
        proxy.on("map", "moved", waend_types::listener(|_| {}));

        assert_eq!(
            proxy.pending("map"),
            PendingCounts {
                calls: 2,
                subscriptions: 1
            }
        );
        assert_eq!(proxy.pending("other"), PendingCounts::default());
    }

    #[test]
    fn register_clears_queue() {
        let proxy = ObjectProxy::new();
        proxy.delegate("map", "zoom", serde_json::json!(3));
        let map = Arc::new(RecordingComponent::new());
        proxy.register("map", &map).unwrap();

        assert_eq!(proxy.pending("map"), PendingCounts::default());
    }

    #[test]
    fn command_debug_hides_closures() {
        let command = Command::Call {
            method: "zoom".into(),
            args: Args::none(),
            reply: Some(reply(|_| {})),
        };
        let text = format!("{command:?}");
        assert!(text.contains("zoom"));
        assert!(text.contains("reply: true"));
    }
}
