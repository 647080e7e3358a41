//! Response DTOs for the node's JSON endpoints
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{ByteView, CacheStats};
use crate::group::{Group, GroupStatsSnapshot};

/// Response body for a front-end lookup (GET /api/:group/:key)
#[derive(Debug, Clone, Serialize)]
pub struct ValueResponse {
    /// The group that served the lookup
    pub group: String,
    /// The requested key
    pub key: String,
    /// The value, decoded as UTF-8 with invalid sequences replaced
    pub value: String,
    /// Length of the raw value in bytes
    pub size: usize,
}

impl ValueResponse {
    /// Creates a new ValueResponse
    pub fn new(group: impl Into<String>, key: impl Into<String>, value: &ByteView) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
            value: value.to_string_lossy(),
            size: value.len(),
        }
    }
}

/// Local store figures of one group
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub entries: usize,
    pub used_bytes: usize,
    pub max_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for CacheStatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            entries: stats.total_entries,
            used_bytes: stats.used_bytes,
            max_bytes: stats.max_bytes,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
        }
    }
}

/// Statistics of one group
#[derive(Debug, Clone, Serialize)]
pub struct GroupStatsResponse {
    pub name: String,
    #[serde(flatten)]
    pub counters: GroupStatsSnapshot,
    pub cache: CacheStatsResponse,
}

impl GroupStatsResponse {
    pub fn from_group(group: &Group) -> Self {
        Self {
            name: group.name().to_string(),
            counters: group.stats(),
            cache: group.cache_stats().into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub groups: Vec<GroupStatsResponse>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
