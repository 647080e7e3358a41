//! Response models for the node's JSON endpoints
//!
//! The peer protocol itself carries raw bytes; these DTOs only back the
//! front-end and operational routes.

pub mod responses;

// Re-export commonly used types
pub use responses::{
    CacheStatsResponse, GroupStatsResponse, HealthResponse, StatsResponse, ValueResponse,
};
