//! Peers Module
//!
//! Capabilities a group uses to locate and query the peer that owns a key,
//! plus their HTTP implementations.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

mod client;
mod pool;

pub use client::{escape_segment, unescape_segment, HttpGetter};
pub use pool::{HttpPool, PoolOptions, DEFAULT_BASE_PATH};

// == Peer Picker ==
/// Chooses the remote peer responsible for a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or None when the key should be served locally.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value for a group from one remote peer.
#[async_trait]
pub trait PeerGetter: Send + Sync {
    async fn get(&self, group: &str, key: &str) -> Result<Vec<u8>>;

    /// Address of the peer, for diagnostics.
    fn addr(&self) -> &str;
}
