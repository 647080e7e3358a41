//! Ring Module
//!
//! Consistent hashing used to pick the peer that owns a key.

mod consistent;

pub use consistent::{default_hash, HashFn, HashRing, DEFAULT_REPLICAS};
