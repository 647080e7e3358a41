//! distcache node
//!
//! Serves one cache group backed by a demo database and shares its keyspace
//! with the peers listed in the configuration.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use distcache::{create_router, AppState, Config, Getter, GroupRegistry, HttpPool};

/// Stand-in for a slow backing database.
struct SlowDb {
    rows: HashMap<&'static str, &'static str>,
    latency: Duration,
}

impl SlowDb {
    fn new() -> Self {
        Self {
            rows: HashMap::from([("Tom", "630"), ("Jack", "589"), ("Sam", "567")]),
            latency: Duration::from_millis(100),
        }
    }
}

#[async_trait]
impl Getter for SlowDb {
    async fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        debug!(key, "[SlowDB] search key");
        tokio::time::sleep(self.latency).await;
        self.rows
            .get(key)
            .map(|value| value.as_bytes().to_vec())
            .with_context(|| format!("{key} not exist"))
    }
}

/// Main entry point for a cache node.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Register the configured group
/// 4. Seed the peer pool and attach it to the group
/// 5. Serve the peer protocol and node endpoints
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "distcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: self={}, peers={:?}, group={}, cache_bytes={}, replicas={}, port={}",
        config.self_addr,
        config.peers,
        config.group_name,
        config.cache_bytes,
        config.replicas,
        config.server_port
    );

    let registry = Arc::new(GroupRegistry::new());
    let group = registry.new_group(config.group_name.clone(), config.cache_bytes, SlowDb::new());

    let pool = Arc::new(
        HttpPool::with_options(config.self_addr.clone(), config.pool_options())
            .context("failed to create peer pool")?,
    );
    pool.set(&config.peers);
    group
        .register_peers(pool.clone())
        .context("failed to attach peers")?;
    info!("Peer pool ready with {} peers", pool.peers().len());

    let app = create_router(AppState::from_config(&config, registry));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Cache node listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
