//! # Change-Tracked State Store
//!
//! Key/value container shared by the orchestrator, feature modules and plugins.
//!
//! ## Key Features
//!
//! - **Changed-value rule**: writing a key's current value is a no-op (no
//!   history record, no notification)
//! - **Bounded undo history**: every effective mutation appends one
//!   [`HistoryRecord`]; the oldest record is evicted past the limit
//! - **Per-key and wildcard subscriptions**: subscribers of `"*"` see every change
//! - **Failure isolation**: a failing subscriber is logged and skipped
//!
//! ## Usage
//!
//! ```rust
//! use accessify_core::state::StateStore;
//! use serde_json::json;
//!
//! let store = StateStore::new();
//! store.set("textSize", json!(1.0));
//! store.set("textSize", json!(1.25));
//! assert!(store.undo());
//! assert_eq!(store.get("textSize"), Some(json!(1.0)));
//! ```

use super::history::{History, HistoryRecord};
use super::selector::Selector;
use crate::constants::{DEFAULT_HISTORY_LIMIT, WILDCARD_KEY};
use crate::error::{AccessifyError, Result};
use crate::events::bus::panic_message;
use crate::events::ListenerResult;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use tracing::{debug, error, warn};

/// Change delivered to state subscribers
///
/// For single-key changes `new_value`/`old_value` are the key's values
/// (`Null` when absent). Bulk changes arrive under key `"*"` with the diff in
/// `new_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    pub key: String,
    pub new_value: Value,
    pub old_value: Value,
}

/// Shared state subscriber
pub type StateSubscriber = Arc<dyn Fn(&StateChange) -> ListenerResult + Send + Sync>;

/// Wrap a closure as a [`StateSubscriber`]
pub fn subscriber<F>(f: F) -> StateSubscriber
where
    F: Fn(&StateChange) -> ListenerResult + Send + Sync + 'static,
{
    Arc::new(f)
}

type SubscriberMap = HashMap<String, Vec<StateSubscriber>>;

struct StoreInner {
    state: BTreeMap<String, Value>,
    history: History,
    version: u64,
}

impl StoreInner {
    fn snapshot(&self) -> Value {
        Value::Object(
            self.state
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// Change-tracked key/value store
pub struct StateStore {
    inner: RwLock<StoreInner>,
    subscribers: Arc<RwLock<SubscriberMap>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(limit: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                state: BTreeMap::new(),
                history: History::new(limit),
                version: 0,
            }),
            subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().state.get(key).cloned()
    }

    pub fn has(&self, key: &str) -> bool {
        self.inner.read().state.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.inner.read().state.len()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.read().state.keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.inner.read().state.values().cloned().collect()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .read()
            .state
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Snapshot of the whole store as a JSON object
    pub fn get_state(&self) -> Value {
        self.inner.read().snapshot()
    }

    /// Write `value` under `key`; returns whether the store changed
    pub fn set(&self, key: &str, value: Value) -> bool {
        if key == WILDCARD_KEY {
            warn!(key = %key, "Refusing to set the wildcard key");
            return false;
        }

        let old_value = {
            let mut inner = self.inner.write();
            let old_value = inner.state.get(key).cloned();
            if old_value.as_ref() == Some(&value) {
                return false;
            }
            inner.history.push(HistoryRecord::new(
                key,
                old_value.clone(),
                Some(value.clone()),
            ));
            inner.state.insert(key.to_string(), value.clone());
            inner.version += 1;
            old_value
        };

        debug!(key = %key, "State updated");
        self.notify(&StateChange {
            key: key.to_string(),
            new_value: value,
            old_value: old_value.unwrap_or(Value::Null),
        });
        true
    }

    /// Apply every entry of `partial` with the changed-value rule
    ///
    /// Wildcard subscribers receive one notification whose `new_value` is the
    /// `{key: {old, new}}` diff. Nothing happens when no key changed.
    pub fn set_state(&self, partial: Value) -> Result<()> {
        let Value::Object(partial) = partial else {
            return Err(AccessifyError::invalid_argument(
                "setState expects a mapping of keys to values",
            ));
        };

        let diff = {
            let mut inner = self.inner.write();
            let previous = inner.snapshot();
            let mut diff = Map::new();

            for (key, value) in partial {
                if key == WILDCARD_KEY {
                    warn!("Ignoring wildcard key in setState");
                    continue;
                }
                let old_value = inner.state.get(&key).cloned();
                if old_value.as_ref() == Some(&value) {
                    continue;
                }
                diff.insert(
                    key.clone(),
                    json!({ "old": old_value.unwrap_or(Value::Null), "new": value.clone() }),
                );
                inner.state.insert(key, value);
            }

            if diff.is_empty() {
                return Ok(());
            }

            let diff = Value::Object(diff);
            inner.history.push(HistoryRecord::new(
                WILDCARD_KEY,
                Some(previous),
                Some(diff.clone()),
            ));
            inner.version += 1;
            diff
        };

        self.notify(&StateChange {
            key: WILDCARD_KEY.to_string(),
            new_value: diff,
            old_value: Value::Null,
        });
        Ok(())
    }

    /// Remove `key`; returns whether it was present
    pub fn delete(&self, key: &str) -> bool {
        let old_value = {
            let mut inner = self.inner.write();
            let Some(old_value) = inner.state.remove(key) else {
                return false;
            };
            inner
                .history
                .push(HistoryRecord::new(key, Some(old_value.clone()), None));
            inner.version += 1;
            old_value
        };

        self.notify(&StateChange {
            key: key.to_string(),
            new_value: Value::Null,
            old_value,
        });
        true
    }

    /// Empty the store, recording one wildcard history record
    pub fn clear(&self) {
        let previous = {
            let mut inner = self.inner.write();
            if inner.state.is_empty() {
                return;
            }
            let previous = inner.snapshot();
            inner.state.clear();
            inner.history.push(HistoryRecord::new(
                WILDCARD_KEY,
                Some(previous.clone()),
                Some(json!({})),
            ));
            inner.version += 1;
            previous
        };

        self.notify(&StateChange {
            key: WILDCARD_KEY.to_string(),
            new_value: json!({}),
            old_value: previous,
        });
    }

    /// Register `callback` for changes of `key` (or every change for `"*"`)
    pub fn subscribe(&self, key: &str, callback: StateSubscriber) -> Subscription {
        self.subscribers
            .write()
            .entry(key.to_string())
            .or_default()
            .push(callback.clone());

        Subscription {
            subscribers: Arc::downgrade(&self.subscribers),
            key: key.to_string(),
            callback,
        }
    }

    /// Remove one registration of `callback` for `key`; no-op when absent
    pub fn unsubscribe(&self, key: &str, callback: &StateSubscriber) {
        remove_subscriber(&mut self.subscribers.write(), key, callback);
    }

    /// Reverse the most recent history record; `false` when history is empty
    pub fn undo(&self) -> bool {
        let change = {
            let mut inner = self.inner.write();
            let Some(record) = inner.history.pop() else {
                return false;
            };

            let change = if record.is_wildcard() {
                let previous = inner.snapshot();
                inner.state.clear();
                if let Some(Value::Object(old_state)) = record.old_value {
                    for (key, value) in old_state {
                        inner.state.insert(key, value);
                    }
                }
                StateChange {
                    key: WILDCARD_KEY.to_string(),
                    new_value: inner.snapshot(),
                    old_value: previous,
                }
            } else {
                let current = match record.old_value.clone() {
                    Some(old_value) => inner.state.insert(record.key.clone(), old_value),
                    None => inner.state.remove(&record.key),
                };
                StateChange {
                    key: record.key.clone(),
                    new_value: record.old_value.unwrap_or(Value::Null),
                    old_value: current.unwrap_or(Value::Null),
                }
            };
            inner.version += 1;
            change
        };

        debug!(key = %change.key, "State change undone");
        self.notify(&change);
        true
    }

    /// History records, oldest first
    pub fn history(&self) -> Vec<HistoryRecord> {
        self.inner.read().history.records()
    }

    pub fn clear_history(&self) {
        self.inner.write().history.clear();
    }

    pub fn history_limit(&self) -> usize {
        self.inner.read().history.limit()
    }

    /// Memoized derivation over the store snapshot
    ///
    /// The derivation reruns only after an effective mutation; repeated reads
    /// of an unchanged store reuse the cached value.
    pub fn create_selector<T, F>(self: &Arc<Self>, compute: F) -> Selector<T>
    where
        T: Clone + Send,
        F: Fn(&Value) -> T + Send + Sync + 'static,
    {
        Selector::new(Arc::clone(self), compute)
    }

    /// Version counter and snapshot read under one lock
    pub(crate) fn versioned_snapshot(&self) -> (u64, Value) {
        let inner = self.inner.read();
        (inner.version, inner.snapshot())
    }

    pub(crate) fn version(&self) -> u64 {
        self.inner.read().version
    }

    fn notify(&self, change: &StateChange) {
        let callbacks: Vec<StateSubscriber> = {
            let subscribers = self.subscribers.read();
            let mut callbacks = subscribers.get(&change.key).cloned().unwrap_or_default();
            if change.key != WILDCARD_KEY {
                if let Some(wildcard) = subscribers.get(WILDCARD_KEY) {
                    callbacks.extend(wildcard.iter().cloned());
                }
            }
            callbacks
        };

        for callback in callbacks {
            let outcome = match catch_unwind(AssertUnwindSafe(|| callback(change))) {
                Ok(result) => result,
                Err(panic) => Err(anyhow::anyhow!(
                    "subscriber panicked: {}",
                    panic_message(&*panic)
                )),
            };
            if let Err(err) = outcome {
                error!(key = %change.key, error = %err, "State subscriber failed");
            }
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("StateStore")
            .field("size", &inner.state.len())
            .field("history", &inner.history.len())
            .field("version", &inner.version)
            .finish()
    }
}

/// Handle returned by [`StateStore::subscribe`]
pub struct Subscription {
    subscribers: Weak<RwLock<SubscriberMap>>,
    key: String,
    callback: StateSubscriber,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Remove the subscription; no-op if the store is gone
    pub fn unsubscribe(self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            remove_subscriber(&mut subscribers.write(), &self.key, &self.callback);
        }
    }
}

fn remove_subscriber(subscribers: &mut SubscriberMap, key: &str, callback: &StateSubscriber) {
    let now_empty = match subscribers.get_mut(key) {
        Some(callbacks) => {
            if let Some(index) = callbacks.iter().position(|c| Arc::ptr_eq(c, callback)) {
                callbacks.remove(index);
            }
            callbacks.is_empty()
        }
        None => false,
    };
    if now_empty {
        subscribers.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn collect(store: &StateStore, key: &str) -> (Arc<Mutex<Vec<StateChange>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription = store.subscribe(
            key,
            subscriber(move |change| {
                sink.lock().push(change.clone());
                Ok(())
            }),
        );
        (seen, subscription)
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let store = StateStore::new();
        let (seen, _sub) = collect(&store, "x");

        assert!(store.set("x", json!(1)));
        assert!(!store.set("x", json!(1)));

        assert_eq!(store.history().len(), 1);
        assert_eq!(seen.lock().len(), 1);
    }

    #[test]
    fn test_key_and_wildcard_subscribers_receive_change() {
        let store = StateStore::new();
        let (per_key, _a) = collect(&store, "theme");
        let (wildcard, _b) = collect(&store, "*");

        store.set("theme", json!("dark"));

        let expected = StateChange {
            key: "theme".to_string(),
            new_value: json!("dark"),
            old_value: Value::Null,
        };
        assert_eq!(per_key.lock().as_slice(), &[expected.clone()]);
        assert_eq!(wildcard.lock().as_slice(), &[expected]);
    }

    #[test]
    fn test_set_state_emits_single_diff() {
        let store = StateStore::new();
        store.set("a", json!(1));
        let (wildcard, _sub) = collect(&store, "*");

        store
            .set_state(json!({ "a": 1, "b": 2, "c": 3 }))
            .expect("mapping accepted");

        let seen = wildcard.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].old_value, Value::Null);
        assert_eq!(
            seen[0].new_value,
            json!({ "b": { "old": null, "new": 2 }, "c": { "old": null, "new": 3 } })
        );
    }

    #[test]
    fn test_set_state_rejects_non_mapping() {
        let store = StateStore::new();
        let err = store.set_state(json!([1, 2])).unwrap_err();
        assert!(matches!(err, AccessifyError::InvalidArgument(_)));
    }

    #[test]
    fn test_undo_of_set_state_restores_previous_snapshot() {
        let store = StateStore::new();
        store.set("a", json!(1));
        store.set_state(json!({ "a": 5, "b": 2 })).unwrap();

        assert!(store.undo());
        assert_eq!(store.get_state(), json!({ "a": 1 }));
    }

    #[test]
    fn test_delete_and_undo() {
        let store = StateStore::new();
        store.set("x", json!("v"));
        assert!(store.delete("x"));
        assert!(!store.delete("x"));
        assert!(!store.has("x"));

        assert!(store.undo());
        assert_eq!(store.get("x"), Some(json!("v")));

        // Undoing the first set deletes the key again
        assert!(store.undo());
        assert!(!store.has("x"));
        assert!(!store.undo());
    }

    #[test]
    fn test_clear_and_undo() {
        let store = StateStore::new();
        store.set("a", json!(1));
        store.set("b", json!(2));
        let (wildcard, _sub) = collect(&store, "*");

        store.clear();
        assert_eq!(store.size(), 0);
        {
            let seen = wildcard.lock();
            assert_eq!(seen[0].new_value, json!({}));
            assert_eq!(seen[0].old_value, json!({ "a": 1, "b": 2 }));
        }

        assert!(store.undo());
        assert_eq!(store.get_state(), json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_clear_on_empty_store_records_nothing() {
        let store = StateStore::new();
        store.clear();
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_unsubscribe_paths() {
        let store = StateStore::new();
        let (seen, subscription) = collect(&store, "k");
        store.set("k", json!(1));
        subscription.unsubscribe();
        store.set("k", json!(2));
        assert_eq!(seen.lock().len(), 1);

        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let callback = subscriber(move |_| {
            *counter.lock() += 1;
            Ok(())
        });
        let _ = store.subscribe("k", callback.clone());
        store.unsubscribe("k", &callback);
        store.set("k", json!(3));
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_failing_subscriber_is_isolated() {
        let store = StateStore::new();
        let _bad = store.subscribe("k", subscriber(|_| Err(anyhow::anyhow!("bad"))));
        let (seen, _good) = collect(&store, "k");

        store.set("k", json!(true));
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(store.get("k"), Some(json!(true)));
    }

    #[test]
    fn test_wildcard_key_cannot_be_set() {
        let store = StateStore::new();
        assert!(!store.set("*", json!(1)));
        assert_eq!(store.size(), 0);
    }
}
