//! Group Statistics Module
//!
//! Lock-free counters describing how a group served its lookups.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Group Stats ==
/// Per-group counters, updated without locking.
#[derive(Debug, Default)]
pub struct GroupStats {
    /// Any `get` request, including those from peers
    pub(crate) gets: AtomicU64,
    /// Requests answered from the local store
    pub(crate) cache_hits: AtomicU64,
    /// Misses handed to the coalescer
    pub(crate) loads: AtomicU64,
    /// Loads that actually executed after coalescing
    pub(crate) loads_deduped: AtomicU64,
    /// Values fetched from a remote peer
    pub(crate) peer_loads: AtomicU64,
    /// Remote peer fetches that failed
    pub(crate) peer_errors: AtomicU64,
    /// Successful local loader calls
    pub(crate) local_loads: AtomicU64,
    /// Failed local loader calls
    pub(crate) local_load_errors: AtomicU64,
    /// Lookups that arrived over the peer protocol
    pub(crate) server_requests: AtomicU64,
}

/// Increments a counter.
pub(crate) fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl GroupStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Snapshot ==
    /// Returns a point-in-time copy of every counter.
    pub fn snapshot(&self) -> GroupStatsSnapshot {
        let read = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        GroupStatsSnapshot {
            gets: read(&self.gets),
            cache_hits: read(&self.cache_hits),
            loads: read(&self.loads),
            loads_deduped: read(&self.loads_deduped),
            peer_loads: read(&self.peer_loads),
            peer_errors: read(&self.peer_errors),
            local_loads: read(&self.local_loads),
            local_load_errors: read(&self.local_load_errors),
            server_requests: read(&self.server_requests),
        }
    }
}

// == Snapshot ==
/// Plain copy of [`GroupStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupStatsSnapshot {
    pub gets: u64,
    pub cache_hits: u64,
    pub loads: u64,
    pub loads_deduped: u64,
    pub peer_loads: u64,
    pub peer_errors: u64,
    pub local_loads: u64,
    pub local_load_errors: u64,
    pub server_requests: u64,
}
