//! Load Statistics Module
//!
//! Counters for how a group's lookups were served.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::CacheStats;

// == Load Stats ==
/// Lock-free counters updated on every lookup.
#[derive(Debug, Default)]
pub struct LoadStats {
    gets: AtomicU64,
    loads: AtomicU64,
    peer_loads: AtomicU64,
    peer_errors: AtomicU64,
    local_loads: AtomicU64,
    local_load_errors: AtomicU64,
}

impl LoadStats {
    pub(crate) fn record_get(&self) {
        self.gets.fetch_add(1, Ordering::Relaxed);
    }

    /// A miss that passed through the deduplicator as leader.
    pub(crate) fn record_load(&self) {
        self.loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_load(&self) {
        self.peer_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_peer_error(&self) {
        self.peer_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local_load(&self) {
        self.local_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_local_load_error(&self) {
        self.local_load_errors.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Combines these counters with the shard's into one report.
    pub fn snapshot(&self, name: &str, cache: CacheStats) -> GroupStats {
        GroupStats {
            name: name.to_string(),
            gets: self.gets.load(Ordering::Relaxed),
            loads: self.loads.load(Ordering::Relaxed),
            peer_loads: self.peer_loads.load(Ordering::Relaxed),
            peer_errors: self.peer_errors.load(Ordering::Relaxed),
            local_loads: self.local_loads.load(Ordering::Relaxed),
            local_load_errors: self.local_load_errors.load(Ordering::Relaxed),
            hit_rate: cache.hit_rate(),
            cache,
        }
    }
}

// == Group Stats ==
/// Point-in-time report for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub name: String,
    /// Lookups with a non-empty key
    pub gets: u64,
    /// Misses that ran a load (deduplicated callers excluded)
    pub loads: u64,
    /// Values served by a remote peer
    pub peer_loads: u64,
    /// Failed peer fetches that fell back to the local source
    pub peer_errors: u64,
    /// Successful calls to the local source
    pub local_loads: u64,
    /// Failed calls to the local source
    pub local_load_errors: u64,
    /// Share of lookups answered by the local shard
    pub hit_rate: f64,
    /// Local shard counters
    pub cache: CacheStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let stats = LoadStats::default();
        stats.record_get();
        stats.record_get();
        stats.record_load();
        stats.record_peer_error();
        stats.record_local_load();

        let snapshot = stats.snapshot("scores", CacheStats::new());
        assert_eq!(snapshot.name, "scores");
        assert_eq!(snapshot.gets, 2);
        assert_eq!(snapshot.loads, 1);
        assert_eq!(snapshot.peer_errors, 1);
        assert_eq!(snapshot.local_loads, 1);
        assert_eq!(snapshot.peer_loads, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let snapshot = LoadStats::default().snapshot("scores", CacheStats::new());
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["name"], "scores");
        assert_eq!(json["cache"]["hits"], 0);
        assert_eq!(json["hit_rate"], 0.0);
    }

    #[test]
    fn test_snapshot_reports_hit_rate() {
        let mut cache = CacheStats::new();
        cache.record_hit();
        cache.record_miss();

        let snapshot = LoadStats::default().snapshot("scores", cache);
        assert_eq!(snapshot.hit_rate, 0.5);
    }
}
