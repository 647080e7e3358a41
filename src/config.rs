//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::peers::{PoolOptions, DEFAULT_BASE_PATH};
use crate::ring::DEFAULT_REPLICAS;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// The ring hash is not configurable here; nodes use CRC-32 (IEEE) unless a
/// custom [`HashFn`](crate::ring::HashFn) is passed in [`PoolOptions`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// This node's own address as listed in `peers`
    pub self_addr: String,
    /// Every node of the cluster, including this one
    pub peers: Vec<String>,
    /// Name of the group served by this node
    pub group_name: String,
    /// Byte budget of the group's local store
    pub cache_bytes: usize,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Path prefix of the peer protocol
    pub base_path: String,
    /// Timeout for requests to peers
    pub peer_timeout: Option<Duration>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `CACHE_SELF` - this node's address (default: http://localhost:8001)
    /// - `CACHE_PEERS` - comma separated peer addresses (default: this node only)
    /// - `CACHE_GROUP` - group name (default: scores)
    /// - `CACHE_BYTES` - byte budget of the local store (default: 2048)
    /// - `CACHE_REPLICAS` - virtual nodes per peer (default: 50)
    /// - `CACHE_BASE_PATH` - peer protocol prefix (default: /_cache/)
    /// - `PEER_TIMEOUT_MS` - peer request timeout in milliseconds (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let self_addr = env::var("CACHE_SELF").unwrap_or(defaults.self_addr);
        let peers = env::var("CACHE_PEERS")
            .ok()
            .map(|v| parse_peers(&v))
            .filter(|peers| !peers.is_empty())
            .unwrap_or_else(|| vec![self_addr.clone()]);

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            self_addr,
            peers,
            group_name: env::var("CACHE_GROUP").unwrap_or(defaults.group_name),
            cache_bytes: parse_var("CACHE_BYTES").unwrap_or(defaults.cache_bytes),
            replicas: parse_var("CACHE_REPLICAS").unwrap_or(defaults.replicas),
            base_path: env::var("CACHE_BASE_PATH")
                .map(|v| normalize_base_path(&v))
                .unwrap_or(defaults.base_path),
            peer_timeout: parse_var("PEER_TIMEOUT_MS").map(Duration::from_millis),
        }
    }

    /// Pool options matching this configuration.
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            base_path: self.base_path.clone(),
            replicas: self.replicas,
            hash: None,
            timeout: self.peer_timeout,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_addr = "http://localhost:8001".to_string();
        Self {
            server_port: 8001,
            peers: vec![self_addr.clone()],
            self_addr,
            group_name: "scores".to_string(),
            cache_bytes: 2048,
            replicas: DEFAULT_REPLICAS,
            base_path: DEFAULT_BASE_PATH.to_string(),
            peer_timeout: None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma separated peer list, dropping blanks and duplicates.
pub fn parse_peers(list: &str) -> Vec<String> {
    let mut peers: Vec<String> = Vec::new();
    for peer in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if !peers.iter().any(|p| p == peer) {
            peers.push(peer.to_string());
        }
    }
    peers
}

/// Ensures the base path starts and ends with `/`.
pub fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8001);
        assert_eq!(config.self_addr, "http://localhost:8001");
        assert_eq!(config.peers, vec!["http://localhost:8001".to_string()]);
        assert_eq!(config.group_name, "scores");
        assert_eq!(config.cache_bytes, 2048);
        assert_eq!(config.replicas, 50);
        assert_eq!(config.base_path, "/_cache/");
        assert_eq!(config.peer_timeout, None);
    }

    #[test]
    fn test_config_from_env_defaults() {
        for var in [
            "SERVER_PORT",
            "CACHE_SELF",
            "CACHE_PEERS",
            "CACHE_GROUP",
            "CACHE_BYTES",
            "CACHE_REPLICAS",
            "CACHE_BASE_PATH",
            "PEER_TIMEOUT_MS",
        ] {
            env::remove_var(var);
        }

        assert_eq!(Config::from_env(), Config::default());
    }

    #[test]
    fn test_parse_peers() {
        let peers = parse_peers(" http://a:1, ,http://b:2,http://a:1 ,");
        assert_eq!(peers, vec!["http://a:1", "http://b:2"]);
        assert!(parse_peers(" , ").is_empty());
    }

    #[test]
    fn test_normalize_base_path() {
        assert_eq!(normalize_base_path("_cache"), "/_cache/");
        assert_eq!(normalize_base_path("/_cache/"), "/_cache/");
        assert_eq!(normalize_base_path("//a/b//"), "/a/b/");
        assert_eq!(normalize_base_path(""), "/");
    }

    #[test]
    fn test_pool_options_follow_config() {
        let config = Config {
            replicas: 7,
            peer_timeout: Some(Duration::from_millis(500)),
            ..Config::default()
        };

        let options = config.pool_options();
        assert_eq!(options.replicas, 7);
        assert_eq!(options.base_path, "/_cache/");
        assert_eq!(options.timeout, Some(Duration::from_millis(500)));
        assert!(options.hash.is_none());
    }
}
