//! # Event Bus
//!
//! Synchronous publish/subscribe hub shared by the orchestrator, feature modules
//! and plugins.
//!
//! ## Delivery Guarantees
//!
//! - Listeners run in registration order, on the caller's thread, one at a time
//! - A failing (or panicking) listener is isolated: the failure is reported and
//!   the remaining listeners still run; `emit` itself never fails
//! - `once` listeners are delivered at most one time, even when `emit` is
//!   re-entered from inside a listener
//!
//! No lock is held while listeners run, so listeners may subscribe, unsubscribe
//! or emit on the same bus.
//!
//! ## Usage
//!
//! ```rust
//! use accessify_core::events::{listener, EventBus};
//! use serde_json::json;
//!
//! let bus = EventBus::new();
//! bus.on("textSizeChanged", listener(|payload| {
//!     println!("new size: {payload}");
//!     Ok(())
//! }));
//! bus.emit("textSizeChanged", &json!(1.25));
//! ```

use crate::constants::events::ERROR;
use crate::error_handling::{ErrorHandler, ErrorKind};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, error};

/// Result returned by event listeners
pub type ListenerResult = anyhow::Result<()>;

/// Shared event listener
///
/// Identity (for [`EventBus::off`]) is the identity of the `Arc`.
pub type Listener = Arc<dyn Fn(&Value) -> ListenerResult + Send + Sync>;

/// Wrap a closure as a [`Listener`]
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&Value) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Anything that can publish events
///
/// Implemented by [`EventBus`]; the error handler only holds a weak reference
/// to an emitter so it never keeps the bus alive.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, payload: &Value);
}

/// Invoke one listener, converting a panic into an error.
pub fn invoke_listener(callback: &Listener, payload: &Value) -> ListenerResult {
    match catch_unwind(AssertUnwindSafe(|| callback(payload))) {
        Ok(result) => result,
        Err(panic) => Err(anyhow::anyhow!("listener panicked: {}", panic_message(&*panic))),
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[derive(Clone)]
struct Registration {
    id: u64,
    /// Callback the caller registered; used for `off`
    identity: Listener,
    /// Callback actually invoked (differs from `identity` for `once`)
    invoke: Listener,
}

type ListenerMap = HashMap<String, Vec<Registration>>;

/// Publish/subscribe hub
pub struct EventBus {
    listeners: Arc<RwLock<ListenerMap>>,
    next_id: AtomicU64,
    error_handler: RwLock<Option<Arc<ErrorHandler>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(RwLock::new(HashMap::new())),
            next_id: AtomicU64::new(1),
            error_handler: RwLock::new(None),
        }
    }

    /// Route listener failures into `handler` (kind `runtime`)
    pub fn attach_error_handler(&self, handler: Arc<ErrorHandler>) {
        *self.error_handler.write() = Some(handler);
    }

    /// Register `callback` for `event`
    pub fn on(&self, event: &str, callback: Listener) -> &Self {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.insert(
            event,
            Registration {
                id,
                identity: callback.clone(),
                invoke: callback,
            },
        );
        self
    }

    /// Register `callback` for exactly one delivery of `event`
    ///
    /// The registration removes itself before the callback runs.
    pub fn once(&self, event: &str, callback: Listener) -> &Self {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let fired = AtomicBool::new(false);
        let listeners: Weak<RwLock<ListenerMap>> = Arc::downgrade(&self.listeners);
        let event_name = event.to_string();
        let original = callback.clone();

        let wrapper: Listener = Arc::new(move |payload: &Value| {
            if fired.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            if let Some(listeners) = listeners.upgrade() {
                remove_where(&mut listeners.write(), &event_name, |r| r.id == id);
            }
            original(payload)
        });

        self.insert(
            event,
            Registration {
                id,
                identity: callback,
                invoke: wrapper,
            },
        );
        self
    }

    /// Remove one registration of `callback` for `event`; no-op when absent
    pub fn off(&self, event: &str, callback: &Listener) -> &Self {
        let mut listeners = self.listeners.write();
        let id = listeners.get(event).and_then(|registrations| {
            registrations
                .iter()
                .find(|r| Arc::ptr_eq(&r.identity, callback))
                .map(|r| r.id)
        });
        if let Some(id) = id {
            remove_where(&mut listeners, event, |r| r.id == id);
        }
        self
    }

    /// Deliver `payload` to every listener of `event`, in registration order
    pub fn emit(&self, event: &str, payload: &Value) {
        let registrations: Vec<Registration> = match self.listeners.read().get(event) {
            Some(registrations) => registrations.clone(),
            None => return,
        };

        debug!(event = %event, listeners = registrations.len(), "Emitting event");

        for registration in &registrations {
            if let Err(err) = invoke_listener(&registration.invoke, payload) {
                self.report_listener_failure(event, err);
            }
        }
    }

    /// Clear the listeners of one event, or of every event when `None`
    pub fn remove_all_listeners(&self, event: Option<&str>) -> &Self {
        let mut listeners = self.listeners.write();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
        self
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    pub fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event) > 0
    }

    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn insert(&self, event: &str, registration: Registration) {
        self.listeners
            .write()
            .entry(event.to_string())
            .or_default()
            .push(registration);
    }

    fn report_listener_failure(&self, event: &str, err: anyhow::Error) {
        // Failures of error listeners are only logged so reporting cannot recurse
        if event == ERROR {
            error!(event = %event, error = %err, "Error listener failed");
            return;
        }

        let handler = self.error_handler.read().clone();
        match handler {
            Some(handler) => {
                handler.handle(
                    &*err,
                    &format!("EventBus.emit({event})"),
                    ErrorKind::Runtime,
                );
            }
            None => error!(event = %event, error = %err, "Event listener failed"),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, event: &str, payload: &Value) {
        EventBus::emit(self, event, payload);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.event_names())
            .finish()
    }
}

/// Remove the first matching registration, dropping the entry when it empties
fn remove_where<P>(listeners: &mut ListenerMap, event: &str, predicate: P)
where
    P: Fn(&Registration) -> bool,
{
    let now_empty = match listeners.get_mut(event) {
        Some(registrations) => {
            if let Some(index) = registrations.iter().position(|r| predicate(r)) {
                registrations.remove(index);
            }
            registrations.is_empty()
        }
        None => false,
    };
    if now_empty {
        listeners.remove(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Listener {
        let log = log.clone();
        listener(move |_| {
            log.lock().push(tag.to_string());
            Ok(())
        })
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("e", recorder(&log, "a"))
            .on("e", recorder(&log, "b"))
            .on("e", recorder(&log, "c"));
        bus.emit("e", &Value::Null);

        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_failing_listener_does_not_stop_siblings() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("e", listener(|_| Err(anyhow::anyhow!("boom"))));
        bus.on("e", listener(|_| panic!("kaboom")));
        bus.on("e", recorder(&log, "survivor"));
        bus.emit("e", &json!({}));

        assert_eq!(*log.lock(), vec!["survivor"]);
    }

    #[test]
    fn test_off_removes_entry_when_last_listener_goes() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let cb = recorder(&log, "x");

        bus.on("e", cb.clone());
        assert_eq!(bus.listener_count("e"), 1);

        bus.off("e", &cb);
        assert_eq!(bus.listener_count("e"), 0);
        assert!(bus.event_names().is_empty());

        // Absent event and absent callback are silent no-ops
        bus.off("missing", &cb);
        bus.off("e", &cb);
    }

    #[test]
    fn test_off_removes_single_instance() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let cb = recorder(&log, "x");

        bus.on("e", cb.clone()).on("e", cb.clone());
        bus.off("e", &cb);
        bus.emit("e", &Value::Null);

        assert_eq!(log.lock().len(), 1);
    }

    #[test]
    fn test_once_delivers_exactly_once_under_reentrancy() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicU64::new(0));

        let inner_bus = Arc::downgrade(&bus);
        let counter = count.clone();
        bus.once(
            "e",
            listener(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                if let Some(bus) = inner_bus.upgrade() {
                    bus.emit("e", &Value::Null);
                }
                Ok(())
            }),
        );

        bus.emit("e", &Value::Null);
        bus.emit("e", &Value::Null);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!bus.has_listeners("e"));
    }

    #[test]
    fn test_remove_all_listeners() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on("a", recorder(&log, "a")).on("b", recorder(&log, "b"));
        bus.remove_all_listeners(Some("a"));
        assert_eq!(bus.event_names(), vec!["b".to_string()]);

        bus.remove_all_listeners(None);
        assert!(bus.event_names().is_empty());
    }
}
