//! Cache Shard Module
//!
//! Thread-safe, lazily initialized wrapper around [`LruCache`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruCache};

// == Cache Shard ==
/// The local portion of the distributed cache held by one node.
///
/// The underlying [`LruCache`] is built on the first write, so a fresh
/// shard costs nothing until it is used. The lock is held only for a
/// single get or add, never across a load.
#[derive(Debug)]
pub struct CacheShard {
    /// Byte budget handed to the LRU, 0 = unbounded
    cache_bytes: usize,
    inner: Mutex<ShardInner>,
    /// Bumped from the LRU eviction callback
    evictions: Arc<AtomicU64>,
}

#[derive(Debug, Default)]
struct ShardInner {
    lru: Option<LruCache>,
    stats: CacheStats,
}

impl CacheShard {
    // == Constructor ==
    /// Creates an empty shard with the given byte budget.
    pub fn new(cache_bytes: usize) -> Self {
        Self {
            cache_bytes,
            inner: Mutex::new(ShardInner::default()),
            evictions: Arc::new(AtomicU64::new(0)),
        }
    }

    // == Get ==
    /// Looks up a key, counting the hit or miss.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let value = inner.lru.as_mut().and_then(|lru| lru.get(key));

        match value {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        value
    }

    // == Add ==
    /// Stores a value, creating the LRU on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let cache_bytes = self.cache_bytes;
        let evictions = self.evictions.clone();

        inner
            .lru
            .get_or_insert_with(|| {
                LruCache::new(
                    cache_bytes,
                    Some(Box::new(move |_, _| {
                        evictions.fetch_add(1, Ordering::Relaxed);
                    })),
                )
            })
            .add(key, value);
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.inner.lock().lru.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the configured byte budget.
    pub fn cache_bytes(&self) -> usize {
        self.cache_bytes
    }

    // == Stats ==
    /// Returns a snapshot of the shard counters.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.evictions = self.evictions.load(Ordering::Relaxed);
        if let Some(lru) = inner.lru.as_ref() {
            stats.total_entries = lru.len();
            stats.total_bytes = lru.nbytes();
        }
        stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_get_before_any_write() {
        let shard = CacheShard::new(1024);
        assert!(shard.get("missing").is_none());
        assert!(shard.is_empty());
        assert_eq!(shard.stats().misses, 1);
    }

    #[test]
    fn test_add_then_get() {
        let shard = CacheShard::new(0);
        shard.add("Tom", ByteView::from("630"));

        assert_eq!(shard.get("Tom"), Some(ByteView::from("630")));
        assert_eq!(shard.len(), 1);

        let stats = shard.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_bytes, 6);
    }

    #[test]
    fn test_evictions_are_counted() {
        let shard = CacheShard::new(8);
        shard.add("ka", ByteView::from("va"));
        shard.add("kb", ByteView::from("vb"));
        shard.add("kc", ByteView::from("vc"));

        let stats = shard.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.total_entries, 2);
        assert!(stats.total_bytes <= 8);
    }

    #[test]
    fn test_concurrent_access() {
        let shard = Arc::new(CacheShard::new(0));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let shard = shard.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("{}-{}", t, i);
                        shard.add(&key, ByteView::from(key.as_str()));
                        assert!(shard.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shard.len(), 800);
    }
}
