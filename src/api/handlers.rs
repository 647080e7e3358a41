//! API Handlers
//!
//! HTTP request handlers for the peer protocol and the node's operational
//! endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{GroupStatsResponse, HealthResponse, StatsResponse, ValueResponse};
use crate::peers::unescape_segment;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Every group this node serves
    pub registry: Arc<GroupRegistry>,
    /// This node's own address, used to label diagnostics
    pub self_addr: String,
    /// Path prefix of the peer protocol
    pub base_path: String,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(
        registry: Arc<GroupRegistry>,
        self_addr: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            self_addr: self_addr.into(),
            base_path: base_path.into(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config, registry: Arc<GroupRegistry>) -> Self {
        Self::new(registry, config.self_addr.clone(), config.base_path.clone())
    }
}

fn plain(status: StatusCode, message: impl Into<String>) -> Response {
    (status, message.into()).into_response()
}

/// Handler for GET `<base_path><group>/<key>`
///
/// Serves a value to another node. Answers with the raw bytes on success,
/// otherwise with a plain text error:
/// - 400 when the path is not exactly `<group>/<key>`
/// - 404 when the group is not registered
/// - 500 when the group's lookup fails
pub async fn peer_handler(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    info!(node = %state.self_addr, method = "GET", path, "peer request");

    let Some(rest) = path.strip_prefix(state.base_path.as_str()) else {
        return plain(StatusCode::BAD_REQUEST, "bad request");
    };
    let parts: Vec<&str> = rest.split('/').collect();
    let [group_name, key] = parts.as_slice() else {
        return plain(StatusCode::BAD_REQUEST, "bad request");
    };
    let (group_name, key) = match (unescape_segment(group_name), unescape_segment(key)) {
        (Ok(group_name), Ok(key)) => (group_name, key),
        (Err(err), _) | (_, Err(err)) => return plain(StatusCode::BAD_REQUEST, err.to_string()),
    };

    let Some(group) = state.registry.get_group(&group_name) else {
        return plain(
            StatusCode::NOT_FOUND,
            CacheError::GroupNotFound(group_name).to_string(),
        );
    };
    group.record_server_request();

    match group.get(&key).await {
        Ok(view) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            view.to_bytes(),
        )
            .into_response(),
        Err(err) => plain(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

/// Handler for GET /api/:group/:key
///
/// Front-end lookup returning the value as JSON.
pub async fn api_handler(
    State(state): State<AppState>,
    Path((group_name, key)): Path<(String, String)>,
) -> Result<Json<ValueResponse>> {
    let group = state
        .registry
        .get_group(&group_name)
        .ok_or_else(|| CacheError::GroupNotFound(group_name.clone()))?;

    let value = group.get(&key).await?;

    Ok(Json(ValueResponse::new(group_name, key, &value)))
}

/// Handler for GET /stats
///
/// Returns statistics for every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let groups = state
        .registry
        .groups()
        .iter()
        .map(|group| GroupStatsResponse::from_group(group))
        .collect();

    Json(StatsResponse { groups })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
