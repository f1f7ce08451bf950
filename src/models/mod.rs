//! Response models for the node's HTTP endpoints
//!
//! This module defines the JSON bodies served next to the binary peer
//! protocol.

pub mod responses;

// Re-export commonly used types
pub use responses::{HealthResponse, StatsResponse};
