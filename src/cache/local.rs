//! Local Cache Module
//!
//! Bounded in-process tier with least-recently-used eviction.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

// == Local Cache ==
/// Capacity-bounded LRU map of `String -> String`.
///
/// Backed by `lru::LruCache`, so lookups, recency updates and evictions are
/// all O(1). Every method takes `&self`; the map sits behind its own mutex
/// so the cache can be shared across threads. No operation can fail.
#[derive(Debug)]
pub struct LocalCache {
    entries: Mutex<LruCache<String, String>>,
}

impl LocalCache {
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    // == Peek ==
    /// Returns the value for `key` without changing its recency.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().peek(key).cloned()
    }

    // == Add ==
    /// Inserts or overwrites `key`, marking it most recently used.
    ///
    /// Inserting a new key into a full cache evicts the least recently used
    /// entry, which is returned.
    pub fn add(&self, key: impl Into<String>, value: impl Into<String>) -> Option<(String, String)> {
        let key = key.into();
        let value = value.into();
        let mut entries = self.entries.lock();

        if let Some(slot) = entries.get_mut(&key) {
            *slot = value;
            return None;
        }
        // Key is new, so anything push hands back was evicted
        entries.push(key, value)
    }

    // == Remove ==
    /// Removes `key`, returning its value. Absent keys are a no-op.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.lock().pop(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}
