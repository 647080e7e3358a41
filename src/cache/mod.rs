//! Cache Module
//!
//! Provides the byte-bounded in-memory value store with LRU eviction.

mod byteview;
mod stats;
mod store;


// Re-export public types
pub use byteview::ByteView;
pub use stats::CacheStats;
pub use store::CacheStore;
