//! Flight Module
//!
//! Request coalescing that keeps concurrent misses from stampeding loaders.

mod coalescer;

pub use coalescer::Coalescer;
