//! GeeCache - A distributed read-through cache
//!
//! Nodes split the key space on a consistent hash ring, load misses from a
//! user-supplied source and fetch keys owned by other nodes over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod group;
pub mod models;
pub mod peers;
pub mod ring;
pub mod singleflight;

pub use api::{create_router, AppState};
pub use cache::ByteView;
pub use config::Config;
pub use error::{CacheError, Result};
pub use group::{Getter, Group, GroupRegistry};
pub use peers::{HttpPool, PeerGetter, PeerPicker};
