//! Memoized derivations over the state store.

use super::store::StateStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

type Compute<T> = Box<dyn Fn(&Value) -> T + Send + Sync>;

/// Accessor created by [`StateStore::create_selector`]
///
/// Caches the last result together with the store version it was computed
/// from. The cache lock is not held while the derivation runs, so a derivation
/// may read other selectors, or this one.
pub struct Selector<T> {
    store: Arc<StateStore>,
    compute: Compute<T>,
    cache: Mutex<Option<(u64, T)>>,
}

impl<T: Clone + Send> Selector<T> {
    pub(crate) fn new<F>(store: Arc<StateStore>, compute: F) -> Self
    where
        F: Fn(&Value) -> T + Send + Sync + 'static,
    {
        Self {
            store,
            compute: Box::new(compute),
            cache: Mutex::new(None),
        }
    }

    pub fn get(&self) -> T {
        if let Some((version, value)) = self.cache.lock().as_ref() {
            if *version == self.store.version() {
                return value.clone();
            }
        }

        let (version, snapshot) = self.store.versioned_snapshot();
        let value = (self.compute)(&snapshot);

        let mut cache = self.cache.lock();
        let newer_cached = matches!(cache.as_ref(), Some((cached, _)) if *cached > version);
        if !newer_cached {
            *cache = Some((version, value.clone()));
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::OnceLock;

    #[test]
    fn test_selector_recomputes_only_after_mutation() {
        let store = Arc::new(StateStore::new());
        store.set("count", json!(2));

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let doubled = store.create_selector(move |state| {
            counter.fetch_add(1, Ordering::SeqCst);
            state["count"].as_i64().unwrap_or(0) * 2
        });

        assert_eq!(doubled.get(), 4);
        assert_eq!(doubled.get(), 4);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // A no-op write is not a mutation
        store.set("count", json!(2));
        assert_eq!(doubled.get(), 4);
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        store.set("count", json!(5));
        assert_eq!(doubled.get(), 10);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_derivation_may_read_its_own_selector() {
        let store = Arc::new(StateStore::new());
        store.set("size", json!(3));

        let this: Arc<OnceLock<Arc<Selector<i64>>>> = Arc::new(OnceLock::new());
        let nested = AtomicBool::new(false);
        let handle = Arc::clone(&this);
        let selector = Arc::new(store.create_selector(move |state| {
            let size = state["size"].as_i64().unwrap_or(0);
            if nested.swap(true, Ordering::SeqCst) {
                return size;
            }
            let inner = handle.get().map_or(0, |selector| selector.get());
            nested.store(false, Ordering::SeqCst);
            size + inner
        }));
        let _ = this.set(Arc::clone(&selector));

        assert_eq!(selector.get(), 6);
        assert_eq!(selector.get(), 6);
    }
}
