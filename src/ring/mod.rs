//! Ring Module
//!
//! Consistent hashing used to route each key to the peer that owns it.

mod hash_ring;

pub use hash_ring::{HashFn, HashRing};

// == Public Constants ==
/// Virtual nodes per peer when none is configured
pub const DEFAULT_REPLICAS: usize = 50;
