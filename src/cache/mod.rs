//! Cache Module
//!
//! Provides the byte-bounded LRU cache and the thread-safe shard each node
//! keeps for its own keys.

mod byteview;
mod lru;
mod shard;
mod stats;


// Re-export public types
pub use byteview::ByteView;
pub use lru::{LruCache, OnEvicted};
pub use shard::CacheShard;
pub use stats::CacheStats;
