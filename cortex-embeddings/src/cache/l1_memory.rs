//! In-process LRU cache for query embeddings, keyed by content hash.

use std::sync::Mutex;

use lru::LruCache;
use std::num::NonZeroUsize;

pub struct L1Cache {
    inner: Mutex<LruCache<String, Vec<f32>>>,
}

impl L1Cache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self { inner: Mutex::new(LruCache::new(cap)) }
    }

    /// Degrades to a cache miss rather than panicking if the lock is
    /// poisoned by an earlier panicked holder.
    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.inner.lock().ok()?.get(key).cloned()
    }

    /// A poisoned lock silently drops the write — a best-effort cache, not
    /// a store of record.
    pub fn put(&self, key: String, value: Vec<f32>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.put(key, value);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
