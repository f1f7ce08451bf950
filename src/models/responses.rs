//! Response DTOs for the node's HTTP endpoints
//!
//! Defines the structure of outgoing JSON bodies.

use serde::Serialize;

use crate::group::GroupStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// This node's own address
    pub node: String,
    /// One entry per registered group
    pub groups: Vec<GroupStats>,
}

impl StatsResponse {
    /// Creates a new StatsResponse
    pub fn new(node: impl Into<String>, groups: Vec<GroupStats>) -> Self {
        Self {
            node: node.into(),
            groups,
        }
    }
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
