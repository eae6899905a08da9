// cache.rs - Keyed load-once resource cache
//
// Each key owns a OnceCell. The map lock is only held long enough to fetch
// or insert the cell, so a slow loader never blocks lookups of other keys.

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::hash::Hash;
use std::sync::Arc;

/// Shared cache that runs the loader for a key at most once.
///
/// Concurrent callers asking for the same key block on the first caller's
/// load and then receive the same `Arc`.
pub struct ResourceCache<K, V> {
    entries: DashMap<K, Arc<OnceCell<Arc<V>>>>,
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Return the cached value for `key`, running `load` on first use.
    pub fn create<F>(&self, key: K, load: F) -> Arc<V>
    where
        F: FnOnce() -> Arc<V>,
    {
        let cell = Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );
        Arc::clone(cell.get_or_init(load))
    }

    /// Return the value for `key` if it has finished loading.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .and_then(|cell| cell.value().get().cloned())
    }

    /// Drop the cache's reference to `key`. Outstanding `Arc`s stay valid.
    pub fn release(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for ResourceCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn loads_each_key_once() {
        let cache: ResourceCache<u32, String> = ResourceCache::new();
        let loads = AtomicUsize::new(0);

        let a = cache.create(7, || {
            loads.fetch_add(1, Ordering::SeqCst);
            Arc::new("seven".to_string())
        });
        let b = cache.create(7, || {
            loads.fetch_add(1, Ordering::SeqCst);
            Arc::new("other".to_string())
        });

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn concurrent_requests_share_one_load() {
        let cache: Arc<ResourceCache<u32, u64>> = Arc::new(ResourceCache::new());
        let loads = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loads = Arc::clone(&loads);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    cache.create(1, || {
                        loads.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(5));
                        Arc::new(42)
                    })
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(*handle.join().unwrap(), 42);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn release_forces_reload() {
        let cache: ResourceCache<u32, u8> = ResourceCache::new();
        cache.create(3, || Arc::new(1));
        assert_eq!(cache.get(&3).as_deref(), Some(&1));

        assert!(cache.release(&3));
        assert!(cache.get(&3).is_none());

        let reloaded = cache.create(3, || Arc::new(2));
        assert_eq!(*reloaded, 2);
    }
}
