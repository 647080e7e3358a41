//! distcache - A distributed in-memory lookup cache
//!
//! Every node keeps a byte-bounded LRU store per group. On a miss the key's
//! owner is found on a consistent hash ring and asked over HTTP; keys the
//! node owns itself, or that a peer fails to serve, are loaded locally.
//! Concurrent misses for the same key share a single load.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;

pub use api::{create_router, AppState};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, GetterFn, Group, GroupRegistry};
pub use peers::{HttpPool, PeerGetter, PeerPicker, PoolOptions};
