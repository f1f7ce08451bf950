//! Group Orchestrator Module
//!
//! Sequences local lookup, peer delegation and local loading for one
//! namespace.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use crate::cache::{ByteView, CacheShard};
use crate::error::{CacheError, Result};
use crate::group::{Getter, GroupStats, LoadStats};
use crate::peers::{PeerGetter, PeerPicker};
use crate::singleflight::SingleFlight;

// == Group ==
/// A cache namespace with its own source, shard and byte budget.
///
/// Only the node owning a key (per the peers' hash ring) keeps it in its
/// shard. Other nodes forward the lookup to the owner and return the
/// answer without caching it.
pub struct Group {
    core: Arc<GroupCore>,
    peers: OnceLock<Arc<dyn PeerPicker>>,
    loader: SingleFlight<Result<ByteView>>,
}

/// State a load needs after its caller has gone away.
struct GroupCore {
    name: String,
    getter: Arc<dyn Getter>,
    main_cache: CacheShard,
    stats: LoadStats,
}

impl Group {
    // == Constructor ==
    /// Creates a group outside of any registry.
    ///
    /// Most callers want [`GroupRegistry::new_group`](crate::group::GroupRegistry::new_group),
    /// which also makes the group reachable by the peer server.
    ///
    /// # Arguments
    /// * `name` - Namespace name
    /// * `cache_bytes` - Shard byte budget, 0 = unbounded
    /// * `getter` - Source loader used on misses
    pub fn new(name: impl Into<String>, cache_bytes: usize, getter: impl Getter) -> Self {
        Self {
            core: Arc::new(GroupCore {
                name: name.into(),
                getter: Arc::new(getter),
                main_cache: CacheShard::new(cache_bytes),
                stats: LoadStats::default(),
            }),
            peers: OnceLock::new(),
            loader: SingleFlight::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    // == Register Peers ==
    /// Attaches the peer picker used to route misses.
    ///
    /// # Panics
    /// If peers were already registered for this group.
    pub fn register_peers(&self, peers: Arc<dyn PeerPicker>) {
        if self.peers.set(peers).is_err() {
            panic!("register_peers called more than once for group {}", self.core.name);
        }
    }

    // == Get ==
    /// Returns the value for `key`.
    ///
    /// Concurrent misses on the same key share a single load. The load runs
    /// to completion and fills the shard even if every caller gives up.
    pub async fn get(&self, key: &str) -> Result<ByteView> {
        if key.is_empty() {
            return Err(CacheError::EmptyKey);
        }
        let core = &self.core;
        core.stats.record_get();

        if let Some(value) = core.main_cache.get(key) {
            debug!(group = %core.name, key, "[GeeCache] hit");
            return Ok(value);
        }

        self.load(key).await
    }

    // == Stats ==
    pub fn stats(&self) -> GroupStats {
        self.core
            .stats
            .snapshot(&self.core.name, self.core.main_cache.stats())
    }

    async fn load(&self, key: &str) -> Result<ByteView> {
        let core = self.core.clone();
        let peers = self.peers.get().cloned();
        let owned_key = key.to_string();

        match self
            .loader
            .work(key, move || core.load(peers, owned_key))
            .await
        {
            Ok(result) => result,
            Err(err) => Err(CacheError::Internal(format!("load task failed: {}", err))),
        }
    }
}

impl GroupCore {
    async fn load(
        self: Arc<Self>,
        peers: Option<Arc<dyn PeerPicker>>,
        key: String,
    ) -> Result<ByteView> {
        self.stats.record_load();

        if let Some(peer) = peers.and_then(|peers| peers.pick_peer(&key)) {
            match self.get_from_peer(peer.as_ref(), &key).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    self.stats.record_peer_error();
                    warn!(group = %self.name, key = %key, error = %err, "[GeeCache] failed to get from peer");
                }
            }
        }

        self.get_locally(key).await
    }

    async fn get_from_peer(&self, peer: &dyn PeerGetter, key: &str) -> Result<ByteView> {
        let bytes = peer.get(&self.name, key).await?;
        self.stats.record_peer_load();
        Ok(ByteView::from(bytes))
    }

    async fn get_locally(&self, key: String) -> Result<ByteView> {
        let getter = self.getter.clone();
        let (loaded, key) = tokio::task::spawn_blocking(move || {
            let loaded = getter.get(&key);
            (loaded, key)
        })
        .await
        .map_err(|e| CacheError::Internal(format!("load task failed: {}", e)))?;

        let bytes = match loaded {
            Ok(bytes) => bytes,
            Err(err) => {
                self.stats.record_local_load_error();
                return Err(CacheError::Load(format!("{:#}", err)));
            }
        };

        // The getter hands over an owned buffer; nothing else aliases it.
        let value = ByteView::from(bytes);
        self.stats.record_local_load();
        self.populate_cache(&key, value.clone());
        Ok(value)
    }

    fn populate_cache(&self, key: &str, value: ByteView) {
        self.main_cache.add(key, value);
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.core.name)
            .field("cache_bytes", &self.core.main_cache.cache_bytes())
            .field("has_peers", &self.peers.get().is_some())
            .finish()
    }
}
