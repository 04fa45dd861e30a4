//! Drop-to-cancel handles for listeners and interceptors.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

/// Handle returned by every `subscribe`/`register` call in this crate.
///
/// The registration stays active until [`unsubscribe`](Subscription::unsubscribe)
/// is called or the handle is dropped.
#[must_use = "dropping a Subscription cancels it immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Ordered set of callbacks keyed by registration id.
///
/// Iteration order is registration order. Callers take a [`snapshot`](Registry::snapshot)
/// and invoke entries after the lock is released, so a callback may freely
/// register or cancel other entries.
pub struct Registry<T: ?Sized> {
    inner: Arc<Mutex<RegistryInner<T>>>,
}

struct RegistryInner<T: ?Sized> {
    next_id: u64,
    entries: BTreeMap<u64, Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Registry<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RegistryInner {
                next_id: 0,
                entries: BTreeMap::new(),
            })),
        }
    }

    pub fn add(&self, entry: Arc<T>) -> Subscription {
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.insert(id, entry);
            id
        };
        let registry: Weak<Mutex<RegistryInner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .entries
                    .remove(&id);
            }
        })
    }

    pub fn snapshot(&self) -> Vec<Arc<T>> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Callback = dyn Fn() + Send + Sync;

    #[test]
    fn test_drop_cancels_registration() {
        let registry: Registry<Callback> = Registry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = hits.clone();
        let first = registry.add(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = hits.clone();
        let second = registry.add(Arc::new(move || {
            counter.fetch_add(10, Ordering::SeqCst);
        }));
        assert_eq!(registry.len(), 2);

        drop(first);
        assert_eq!(registry.len(), 1);
        for callback in registry.snapshot() {
            callback();
        }
        assert_eq!(hits.load(Ordering::SeqCst), 10);

        second.unsubscribe();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry: Registry<Callback> = Registry::new();
        let handle = registry.add(Arc::new(|| {}));
        drop(registry);
        // Cancelling after the registry is gone must be a no-op.
        handle.unsubscribe();
    }
}
