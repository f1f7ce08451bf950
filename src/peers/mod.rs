//! Peers Module
//!
//! Peer selection and the HTTP client used to fetch keys from other nodes.
//!
//! # Wire Format
//! - `GET {peer}{base_path}{namespace}/{key}` with both segments percent-encoded
//! - `200` with the raw value as `application/octet-stream`
//! - `400` malformed path, `404` unknown namespace, `500` load failure

mod client;
mod pool;

use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;

use crate::error::Result;

pub use client::HttpGetter;
pub use pool::HttpPool;

// == Public Constants ==
/// Path prefix for peer requests
pub const DEFAULT_BASE_PATH: &str = "/_geecache/";

// == Peer Picker ==
/// Locates the peer that owns a key.
pub trait PeerPicker: Send + Sync {
    /// Returns the owning peer, or `None` when the key has no owner or the
    /// local node owns it.
    fn pick_peer(&self, key: &str) -> Option<Arc<dyn PeerGetter>>;
}

// == Peer Getter ==
/// Fetches a value from one remote peer.
pub trait PeerGetter: Send + Sync {
    fn get<'a>(&'a self, group: &'a str, key: &'a str) -> BoxFuture<'a, Result<Bytes>>;
}
