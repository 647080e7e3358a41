//! Group Module
//!
//! A group is a cache namespace: a name, a loader, a local byte-bounded
//! store and, optionally, the peers that share its keyspace.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::{ByteView, CacheStats, CacheStore};
use crate::error::{CacheError, Result};
use crate::flight::Coalescer;
use crate::group::stats::{bump, GroupStats, GroupStatsSnapshot};
use crate::group::Getter;
use crate::peers::{PeerGetter, PeerPicker};

// == Group ==
/// A named cache namespace.
///
/// Lookups go to the local store first. On a miss the key's owning peer is
/// asked, falling back to the local loader when no peer owns it or the peer
/// cannot be reached. Concurrent misses for one key share a single load,
/// which runs to completion even if the caller that started it goes away.
pub struct Group {
    core: Arc<GroupCore>,
    loader: Coalescer<ByteView>,
}

/// State a load needs, shared with the task that runs it.
struct GroupCore {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: Mutex<CacheStore>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    stats: GroupStats,
}

impl Group {
    // == Constructor ==
    /// Creates a group whose local store holds at most `cache_bytes` bytes.
    ///
    /// Most callers go through [`GroupRegistry::new_group`](crate::group::GroupRegistry::new_group)
    /// so the group can be found by the peer protocol handler.
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: impl Getter + 'static) -> Self {
        Self {
            core: Arc::new(GroupCore {
                name: name.into(),
                getter: Arc::new(getter),
                main_cache: Mutex::new(CacheStore::new(cache_bytes)),
                peers: OnceLock::new(),
                stats: GroupStats::new(),
            }),
            loader: Coalescer::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    // == Register Peers ==
    /// Attaches the peer picker used to route misses.
    ///
    /// A group accepts exactly one picker; a second call is a configuration
    /// error.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) -> Result<()> {
        self.core.peers.set(peers).map_err(|_| {
            CacheError::Config(format!(
                "register_peers called more than once for group {}",
                self.core.name
            ))
        })
    }

    // == Get ==
    /// Returns the value for `key`, loading it on a miss.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        bump(&self.core.stats.gets);
        if key.is_empty() {
            return Err(CacheError::InvalidKey);
        }

        if let Some(value) = self.core.lookup_cache(key) {
            debug!(group = %self.core.name, key, "cache hit");
            return Ok(value);
        }

        self.load(key).await
    }

    // == Load ==
    async fn load(&self, key: &str) -> Result<ByteView> {
        bump(&self.core.stats.loads);

        let core = self.core.clone();
        let owned_key = key.to_string();
        self.loader
            .work(key, move || async move { core.load(&owned_key).await })
            .await
    }

    // == Stats ==
    pub fn stats(&self) -> GroupStatsSnapshot {
        self.core.stats.snapshot()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.core.main_cache.lock().stats()
    }

    /// Counts a lookup that arrived over the peer protocol.
    pub(crate) fn record_server_request(&self) {
        bump(&self.core.stats.server_requests);
    }
}

impl GroupCore {
    /// One coalesced load: the owning peer first, then the local loader.
    async fn load(&self, key: &str) -> Result<ByteView> {
        // A wave that finished just before this one may have filled the store.
        if let Some(value) = self.lookup_cache(key) {
            return Ok(value);
        }
        bump(&self.stats.loads_deduped);

        if let Some(peer) = self.peers.get().and_then(|peers| peers.pick_peer(key)) {
            match self.get_from_peer(peer.as_ref(), key).await {
                Ok(value) => {
                    bump(&self.stats.peer_loads);
                    return Ok(value);
                }
                Err(err) => {
                    bump(&self.stats.peer_errors);
                    warn!(
                        group = %self.name,
                        key,
                        peer = peer.addr(),
                        error = %err,
                        "failed to get from peer, loading locally"
                    );
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        Ok(ByteView::new(bytes))
    }

    // == Get Locally ==
    async fn get_locally(&self, key: &str) -> Result<ByteView> {
        debug!(group = %self.name, key, "loading from getter");
        match self.getter.get(key).await {
            Ok(bytes) => {
                bump(&self.stats.local_loads);
                let value = ByteView::new(bytes);
                self.populate_cache(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                bump(&self.stats.local_load_errors);
                Err(CacheError::Loader(format!("{err:#}")))
            }
        }
    }

    fn lookup_cache(&self, key: &str) -> Option<ByteView> {
        let value = self.main_cache.lock().get(key);
        if value.is_some() {
            bump(&self.stats.cache_hits);
        }
        value
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.lock().add(key, value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.core.name)
            .field("has_peers", &self.core.peers.get().is_some())
            .finish_non_exhaustive()
    }
}
