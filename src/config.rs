//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::peers::DEFAULT_BASE_PATH;
use crate::ring::DEFAULT_REPLICAS;

const DEFAULT_PORT: u16 = 8001;
const DEFAULT_CACHE_BYTES: usize = 2 << 10;
const DEFAULT_PEER_TIMEOUT_MS: u64 = 3000;
const DEFAULT_GROUP_NAME: &str = "scores";

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// This node's own base address, as it appears in `peers`
    pub self_addr: String,
    /// Base addresses of every node in the pool, this one included
    pub peers: Vec<String>,
    /// Path prefix for peer requests
    pub base_path: String,
    /// Virtual nodes per peer on the hash ring
    pub replicas: usize,
    /// Byte budget of the group's shard, 0 = unbounded
    pub cache_bytes: usize,
    /// Upper bound for one peer fetch
    pub peer_timeout: Duration,
    /// Namespace served by this node
    pub group_name: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8001)
    /// - `SELF_ADDR` - Own base address (default: `http://localhost:{SERVER_PORT}`)
    /// - `PEERS` - Comma-separated peer addresses (default: `SELF_ADDR`)
    /// - `BASE_PATH` - Peer path prefix (default: `/_geecache/`)
    /// - `REPLICAS` - Virtual nodes per peer (default: 50)
    /// - `CACHE_BYTES` - Shard byte budget (default: 2048)
    /// - `PEER_TIMEOUT_MS` - Peer fetch timeout in milliseconds (default: 3000)
    /// - `GROUP_NAME` - Served namespace (default: scores)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from an arbitrary variable source.
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = parse_or(&lookup, "SERVER_PORT", DEFAULT_PORT);
        let self_addr = lookup("SELF_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| local_addr(server_port));

        let mut peers = lookup("PEERS").map(|v| parse_peers(&v)).unwrap_or_default();
        if peers.is_empty() {
            peers.push(self_addr.clone());
        }

        Self {
            server_port,
            self_addr,
            peers,
            base_path: lookup("BASE_PATH").unwrap_or_else(|| DEFAULT_BASE_PATH.to_string()),
            replicas: parse_or(&lookup, "REPLICAS", DEFAULT_REPLICAS),
            cache_bytes: parse_or(&lookup, "CACHE_BYTES", DEFAULT_CACHE_BYTES),
            peer_timeout: Duration::from_millis(parse_or(
                &lookup,
                "PEER_TIMEOUT_MS",
                DEFAULT_PEER_TIMEOUT_MS,
            )),
            group_name: lookup("GROUP_NAME").unwrap_or_else(|| DEFAULT_GROUP_NAME.to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let self_addr = local_addr(DEFAULT_PORT);
        Self {
            server_port: DEFAULT_PORT,
            peers: vec![self_addr.clone()],
            self_addr,
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            cache_bytes: DEFAULT_CACHE_BYTES,
            peer_timeout: Duration::from_millis(DEFAULT_PEER_TIMEOUT_MS),
            group_name: DEFAULT_GROUP_NAME.to_string(),
        }
    }
}

fn local_addr(port: u16) -> String {
    format!("http://localhost:{}", port)
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated address list, dropping blanks and trailing `/`.
fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
