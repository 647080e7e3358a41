//! Group Module
//!
//! Cache namespaces, their loaders, and the registry that owns them.

mod getter;
mod namespace;
mod registry;
mod stats;

pub use getter::{Getter, GetterFn};
pub use namespace::Group;
pub use registry::GroupRegistry;
pub use stats::{GroupStats, GroupStatsSnapshot};
