//! Hash Ring Module
//!
//! Consistent hash ring with virtual nodes.

use std::collections::HashMap;
use std::fmt;

/// Hash function used to place virtual nodes and keys on the ring.
pub type HashFn = fn(&[u8]) -> u32;

// == Hash Ring ==
/// Maps keys to peers.
///
/// Every peer gets `replicas` virtual nodes, hashed from `"{i}{peer}"`.
/// A key belongs to the first virtual node whose hash is greater than or
/// equal to the key's hash, wrapping around past the largest one.
#[derive(Clone)]
pub struct HashRing {
    hash: HashFn,
    /// Virtual nodes per peer
    replicas: usize,
    /// Sorted virtual node hashes
    keys: Vec<u32>,
    /// Virtual node hash to peer
    owners: HashMap<u32, String>,
}

impl HashRing {
    // == Constructor ==
    /// Creates an empty ring.
    ///
    /// # Arguments
    /// * `replicas` - Virtual nodes per peer, must match across the fleet
    /// * `hash` - Hash function, defaults to CRC-32 (IEEE)
    pub fn new(replicas: usize, hash: Option<HashFn>) -> Self {
        Self {
            hash: hash.unwrap_or(crc32fast::hash),
            replicas,
            keys: Vec::new(),
            owners: HashMap::new(),
        }
    }

    // == Add ==
    /// Registers peers on the ring.
    pub fn add<I, S>(&mut self, peers: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for peer in peers {
            let peer = peer.as_ref();
            for i in 0..self.replicas {
                let hash = (self.hash)(format!("{}{}", i, peer).as_bytes());
                self.keys.push(hash);
                self.owners.insert(hash, peer.to_string());
            }
        }
        self.keys.sort_unstable();
    }

    // == Get ==
    /// Returns the peer owning `key`, or `None` if the ring is empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        if self.keys.is_empty() {
            return None;
        }

        let hash = (self.hash)(key.as_bytes());
        let idx = self.keys.partition_point(|&k| k < hash);
        let vnode = self.keys[idx % self.keys.len()];

        self.owners.get(&vnode).map(String::as_str)
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Returns the number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

impl fmt::Debug for HashRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("replicas", &self.replicas)
            .field("vnodes", &self.keys.len())
            .finish()
    }
}
