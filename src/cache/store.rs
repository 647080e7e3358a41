//! Cache Store Module
//!
//! Byte-bounded value store on top of an unbounded LRU map.

use lru::LruCache;
use tracing::trace;

use crate::cache::{ByteView, CacheStats};

// == Cache Store ==
/// Key-value store with a maximum total byte budget and LRU eviction.
///
/// Each entry is charged `key.len() + value.len()` bytes. After every
/// mutating call the charged total is at most `max_bytes`.
///
/// The store itself is not synchronized; owners wrap it in a lock.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage in recency order
    entries: LruCache<String, ByteView>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of bytes allowed
    max_bytes: usize,
    /// Bytes currently charged
    used_bytes: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore holding at most `max_bytes` bytes.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            stats: CacheStats::new(max_bytes),
            max_bytes,
            used_bytes: 0,
        }
    }

    // == Add ==
    /// Inserts or replaces the value stored under `key`.
    ///
    /// Least recently used entries are evicted until the byte budget holds
    /// again. A value that alone exceeds the budget evicts everything,
    /// including itself.
    pub fn add(&mut self, key: &str, value: ByteView) {
        let value_len = value.len();

        match self.entries.put(key.to_string(), value) {
            Some(old) => self.used_bytes = self.used_bytes - old.len() + value_len,
            None => self.used_bytes += key.len() + value_len,
        }

        while self.used_bytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }

        self.stats.set_occupancy(self.entries.len(), self.used_bytes);
    }

    // == Get ==
    /// Retrieves a value by key, marking it as recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        match self.entries.get(key) {
            Some(value) => {
                let value = value.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry.
    pub fn remove_oldest(&mut self) -> Option<(String, ByteView)> {
        let (key, value) = self.entries.pop_lru()?;

        self.used_bytes -= key.len() + value.len();
        self.stats.record_eviction();
        self.stats.set_occupancy(self.entries.len(), self.used_bytes);
        trace!(key = %key, bytes = value.len(), "evicted entry");

        Some((key, value))
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.entries.len(), self.used_bytes);
        stats
    }

    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of bytes currently charged against the budget.
    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }
}
