//! HTTP Pool Module
//!
//! Owns the hash ring and one client per peer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::peers::{HttpGetter, PeerGetter, PeerPicker, DEFAULT_BASE_PATH};
use crate::ring::{HashFn, HashRing, DEFAULT_REPLICAS};

/// Default upper bound for one peer fetch
pub const DEFAULT_PEER_TIMEOUT: Duration = Duration::from_secs(3);

// == HTTP Pool ==
/// Routes keys to peers over HTTP.
///
/// The ring and the client map are replaced together by [`HttpPool::set`],
/// so a concurrent [`PeerPicker::pick_peer`] sees either the old or the new
/// membership, never a mix.
#[derive(Debug)]
pub struct HttpPool {
    /// Own base address, e.g. `http://localhost:8001`
    self_addr: String,
    base_path: String,
    replicas: usize,
    hash: Option<HashFn>,
    timeout: Duration,
    client: reqwest::Client,
    state: RwLock<PoolState>,
}

#[derive(Debug)]
struct PoolState {
    ring: HashRing,
    getters: HashMap<String, Arc<HttpGetter>>,
}

impl HttpPool {
    // == Constructor ==
    /// Creates a pool for the node reachable at `self_addr` with default
    /// base path, replica count and timeout.
    pub fn new(self_addr: impl Into<String>) -> Self {
        Self {
            self_addr: self_addr.into(),
            base_path: DEFAULT_BASE_PATH.to_string(),
            replicas: DEFAULT_REPLICAS,
            hash: None,
            timeout: DEFAULT_PEER_TIMEOUT,
            client: reqwest::Client::new(),
            state: RwLock::new(PoolState {
                ring: HashRing::new(DEFAULT_REPLICAS, None),
                getters: HashMap::new(),
            }),
        }
    }

    /// Sets the path prefix peers are served under.
    ///
    /// # Panics
    /// If `base_path` does not start and end with `/`. The server mounts
    /// itself on this prefix, so a malformed one is a wiring bug.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        assert!(
            base_path.starts_with('/') && base_path.ends_with('/'),
            "base path must start and end with '/': {:?}",
            base_path
        );
        self.base_path = base_path;
        self
    }

    /// Sets the number of virtual nodes per peer.
    pub fn with_replicas(mut self, replicas: usize) -> Self {
        self.replicas = replicas;
        self
    }

    /// Replaces the ring hash function.
    pub fn with_hash(mut self, hash: HashFn) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Sets the timeout for one peer fetch.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn self_addr(&self) -> &str {
        &self.self_addr
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    // == Set ==
    /// Replaces the pool's membership.
    ///
    /// The list should include this node's own address so that keys it
    /// owns are loaded locally.
    pub fn set<I, S>(&self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let peers: Vec<String> = peers.into_iter().map(|p| p.as_ref().to_string()).collect();

        let mut ring = HashRing::new(self.replicas, self.hash);
        ring.add(&peers);

        let getters = peers
            .iter()
            .map(|peer| {
                let getter = HttpGetter::new(
                    format!("{}{}", peer, self.base_path),
                    self.client.clone(),
                    self.timeout,
                );
                (peer.clone(), Arc::new(getter))
            })
            .collect();

        *self.state.write() = PoolState { ring, getters };
        info!("[Server {}] peers set: {:?}", self.self_addr, peers);
    }

    /// Returns the address owning `key` on the current ring.
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.state.read().ring.get(key).map(str::to_string)
    }
}

impl PeerPicker for HttpPool {
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>> {
        let state = self.state.read();
        let peer = state.ring.get(key)?;
        if peer == self.self_addr {
            return None;
        }

        debug!("[Server {}] pick peer {}", self.self_addr, peer);
        state
            .getters
            .get(peer)
            .map(|getter| getter.clone() as Arc<dyn PeerGetter>)
    }
}
