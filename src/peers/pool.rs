//! Peer Pool Module
//!
//! Tracks the node's peers and routes keys to them through the hash ring.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::peers::{HttpGetter, PeerGetter, PeerPicker};
use crate::ring::{HashFn, HashRing, DEFAULT_REPLICAS};

/// Default path prefix of the peer protocol.
pub const DEFAULT_BASE_PATH: &str = "/_cache/";

// == Pool Options ==
/// Tuning knobs for an [`HttpPool`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Path prefix shared by every node, e.g. `/_cache/`
    pub base_path: String,
    /// Virtual nodes per peer on the ring
    pub replicas: usize,
    /// Ring hash; None selects CRC-32 (IEEE)
    pub hash: Option<HashFn>,
    /// Per-request timeout for peer fetches; None waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            timeout: None,
        }
    }
}

#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

// == HTTP Pool ==
/// The set of peers a node shares its keyspace with.
///
/// Implements [`PeerPicker`]: keys are resolved on the ring, and keys the
/// node owns itself are served locally instead of looping back over HTTP.
#[derive(Debug)]
pub struct HttpPool {
    self_addr: String,
    options: PoolOptions,
    client: reqwest::Client,
    state: Mutex<PoolState>,
}

impl HttpPool {
    // == Constructors ==
    /// Creates a pool for the node reachable at `self_addr`
    /// (e.g. `http://10.0.0.1:8001`), using default options.
    pub fn new(self_addr: impl Into<String>) -> Result<Self> {
        Self::with_options(self_addr, PoolOptions::default())
    }

    pub fn with_options(self_addr: impl Into<String>, options: PoolOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| CacheError::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            self_addr: self_addr.into(),
            state: Mutex::new(PoolState {
                ring: HashRing::new(options.replicas, options.hash),
                getters: HashMap::new(),
            }),
            options,
            client,
        })
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.options.base_path
    }

    // == Set ==
    /// Replaces the peer list. Each peer is a base address such as
    /// `http://10.0.0.2:8001`; the list should include this node.
    pub fn set<S: AsRef<str>>(&self, peers: &[S]) {
        let getters: HashMap<String, Arc<HttpGetter>> = peers
            .iter()
            .map(|peer| {
                let peer = peer.as_ref();
                let base_url = format!("{}{}", peer.trim_end_matches('/'), self.options.base_path);
                (
                    peer.to_string(),
                    Arc::new(HttpGetter::new(base_url, self.client.clone())),
                )
            })
            .collect();

        let mut state = self.state.lock();
        state.ring.seed(peers);
        state.getters = getters;

        info!(node = %self.self_addr, peers = peers.len(), "peer set replaced");
    }

    /// Returns the current peer addresses, sorted.
    pub fn peers(&self) -> Vec<String> {
        let mut peers: Vec<String> = self.state.lock().getters.keys().cloned().collect();
        peers.sort();
        peers
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        // URL parsing collapses "." and ".." path segments, escaped or not,
        // so such keys can never reach their owner.
        if key == "." || key == ".." {
            return None;
        }

        let state = self.state.lock();
        let peer = state.ring.resolve(key)?;
        if peer == self.self_addr {
            return None;
        }

        debug!(node = %self.self_addr, peer, key, "picked peer");
        state
            .getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF: &str = "http://10.0.0.1:8001";

    fn length_hash(data: &[u8]) -> u32 {
        data.len() as u32
    }

    #[test]
    fn test_empty_pool_serves_locally() {
        let pool = HttpPool::new(SELF).unwrap();
        assert!(pool.pick_peer("Tom").is_none());
    }

    #[test]
    fn test_self_only_pool_serves_locally() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set(&[SELF]);

        for i in 0..100 {
            assert!(pool.pick_peer(&format!("key-{i}")).is_none());
        }
    }

    #[test]
    fn test_remote_owner_is_picked() {
        let remote = "http://10.0.0.2:8001";
        let pool = HttpPool::new(SELF).unwrap();
        pool.set(&[remote]);

        let peer = pool.pick_peer("Tom").unwrap();
        assert_eq!(peer.addr(), "http://10.0.0.2:8001/_cache/");
    }

    #[test]
    fn test_keys_split_between_self_and_peer() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set(&[SELF, "http://10.0.0.2:8001"]);

        let remote = (0..1000)
            .filter(|i| pool.pick_peer(&format!("key-{i}")).is_some())
            .count();

        assert!(remote > 0 && remote < 1000, "remote share {remote}");
    }

    #[test]
    fn test_set_replaces_peers() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set(&[SELF, "http://10.0.0.2:8001"]);
        pool.set(&[SELF, "http://10.0.0.3:8001/"]);

        assert_eq!(pool.peers(), vec![SELF, "http://10.0.0.3:8001/"]);
        let addrs: Vec<String> = (0..200)
            .filter_map(|i| pool.pick_peer(&format!("key-{i}")))
            .map(|peer| peer.addr().to_string())
            .collect();
        assert!(addrs.iter().all(|a| a == "http://10.0.0.3:8001/_cache/"));
    }

    #[test]
    fn test_dot_segment_keys_are_served_locally() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set(&["http://10.0.0.2:8001"]);

        assert!(pool.pick_peer(".").is_none());
        assert!(pool.pick_peer("..").is_none());
        assert!(pool.pick_peer("a.b").is_some());
        assert!(pool.pick_peer("...").is_some());
    }

    #[test]
    fn test_duplicate_peers_collapse() {
        let pool = HttpPool::new(SELF).unwrap();
        pool.set(&[SELF, "http://10.0.0.2:8001", SELF, "http://10.0.0.2:8001"]);

        assert_eq!(pool.peers(), vec![SELF, "http://10.0.0.2:8001"]);
        assert_eq!(pool.state.lock().ring.len(), 2 * DEFAULT_REPLICAS);
    }

    #[test]
    fn test_custom_options() {
        let options = PoolOptions {
            base_path: "/_peers/".to_string(),
            replicas: 3,
            hash: Some(length_hash as HashFn),
            timeout: Some(Duration::from_millis(250)),
        };
        let pool = HttpPool::with_options(SELF, options).unwrap();
        pool.set(&["http://10.0.0.9:9000"]);

        assert_eq!(pool.base_path(), "/_peers/");
        let peer = pool.pick_peer("k").unwrap();
        assert_eq!(peer.addr(), "http://10.0.0.9:9000/_peers/");
    }
}
