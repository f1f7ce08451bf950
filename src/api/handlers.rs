//! API Handlers
//!
//! HTTP request handlers for the peer protocol and node endpoints.

use std::borrow::Cow;

use axum::{
    extract::State,
    http::{header, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};
use percent_encoding::percent_decode_str;
use tracing::{debug, error};

use crate::error::{CacheError, Result};
use crate::group::GroupRegistry;
use crate::models::{HealthResponse, StatsResponse};
use crate::peers::HttpPool;

/// Application state shared across all handlers.
///
/// The registry is the only way the server finds groups; it is injected
/// here rather than looked up globally.
#[derive(Clone)]
pub struct AppState {
    /// Groups served by this node
    pub registry: GroupRegistry,
    /// This node's own address, for logs and stats
    pub node: String,
    /// Prefix the peer handler is mounted under
    pub base_path: String,
}

impl AppState {
    /// Creates a new AppState serving `registry` under the pool's base path.
    pub fn new(registry: GroupRegistry, pool: &HttpPool) -> Self {
        Self {
            registry,
            node: pool.self_addr().to_string(),
            base_path: pool.base_path().to_string(),
        }
    }
}

/// Handler for GET {base_path}{group}/{key}
///
/// Looks the key up in the named group on this node and returns the raw
/// value bytes.
pub async fn peer_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
) -> Result<Response> {
    let path = uri.path();
    let Some(rest) = path.strip_prefix(state.base_path.as_str()) else {
        // The router only mounts this handler under the base path
        error!("[Server {}] serving unexpected path: {}", state.node, path);
        return Err(CacheError::BadRequest(format!("unexpected path: {}", path)));
    };
    debug!("[Server {}] {} {}", state.node, method, path);

    let (group_name, key) = parse_peer_path(rest)?;

    let group = state
        .registry
        .get_group(&group_name)
        .ok_or(CacheError::GroupNotFound(group_name))?;

    let view = group.get(&key).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        view.byte_slice(),
    )
        .into_response())
}

/// Splits `<group>/<key>` at the first separator and decodes both parts.
fn parse_peer_path(rest: &str) -> Result<(String, String)> {
    let (group, key) = rest
        .split_once('/')
        .ok_or_else(|| CacheError::BadRequest(format!("expected <group>/<key>, got {:?}", rest)))?;

    Ok((decode_segment(group)?, decode_segment(key)?))
}

fn decode_segment(segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| CacheError::BadRequest(format!("invalid path segment: {}", e)))
}

/// Handler for GET /stats
///
/// Returns the counters of every registered group.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let groups = state
        .registry
        .groups()
        .iter()
        .map(|group| group.stats())
        .collect();

    Json(StatsResponse::new(state.node, groups))
}

/// Handler for GET /health
///
/// Returns health status of the node.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
