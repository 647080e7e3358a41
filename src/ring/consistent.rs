//! Consistent Hash Ring Module
//!
//! Maps keys to peers using virtual replicas on a 32-bit hash ring.

use std::collections::HashSet;

use tracing::debug;

// == Hash Function ==
/// Hash used to place keys and virtual nodes on the ring.
pub type HashFn = fn(&[u8]) -> u32;

/// Default number of virtual nodes per peer.
pub const DEFAULT_REPLICAS: usize = 50;

/// Default hash: CRC-32 (IEEE).
pub fn default_hash(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

// == Hash Ring ==
/// A consistent hash ring.
///
/// Every peer occupies `replicas` positions, each at
/// `hash(format!("{index}{peer}"))`. The position list is kept sorted by
/// `(hash, peer)`, so equal seeds always resolve identically.
#[derive(Debug, Clone)]
pub struct HashRing {
    hash: HashFn,
    replicas: usize,
    /// Sorted virtual nodes: (position, real peer)
    nodes: Vec<(u32, String)>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring. `None` selects [`default_hash`].
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(default_hash),
            replicas,
            nodes: Vec::new(),
        }
    }

    // == Seed ==
    /// Replaces the whole peer set.
    ///
    /// A peer listed more than once still gets exactly `replicas` positions.
    pub fn seed<S: AsRef<str>>(&mut self, peers: &[S]) {
        let mut seen = HashSet::with_capacity(peers.len());
        let mut nodes = Vec::with_capacity(peers.len() * self.replicas);
        for peer in peers {
            let peer = peer.as_ref();
            if !seen.insert(peer) {
                continue;
            }
            for i in 0..self.replicas {
                let position = (self.hash)(format!("{i}{peer}").as_bytes());
                nodes.push((position, peer.to_string()));
            }
        }
        nodes.sort_unstable();

        debug!(
            peers = seen.len(),
            virtual_nodes = nodes.len(),
            "seeded hash ring"
        );
        self.nodes = nodes;
    }

    // == Resolve ==
    /// Returns the peer owning `key`, or None when the ring is empty.
    ///
    /// The owner is the first virtual node at or after the key's hash,
    /// wrapping around to the start of the ring.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        if self.nodes.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.nodes.partition_point(|(position, _)| *position < hash);
        let (_, peer) = &self.nodes[idx % self.nodes.len()];
        Some(peer.as_str())
    }

    /// Returns true when no peers are seeded.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new(DEFAULT_REPLICAS, None)
    }
}
