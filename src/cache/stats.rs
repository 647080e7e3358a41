//! Cache Statistics Module
//!
//! Tracks store performance metrics including hits, misses, and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks store performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of successful store retrievals
    pub hits: u64,
    /// Number of failed store retrievals
    pub misses: u64,
    /// Number of entries evicted to satisfy the byte budget
    pub evictions: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
    /// Bytes currently charged against the budget
    pub used_bytes: usize,
    /// Configured byte budget
    pub max_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Calculates the store hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Occupancy ==
    /// Updates the entry count and byte usage.
    pub fn set_occupancy(&mut self, entries: usize, used_bytes: usize) {
        self.total_entries = entries;
        self.used_bytes = used_bytes;
    }
}
