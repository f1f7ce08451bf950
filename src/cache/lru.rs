//! LRU Cache Module
//!
//! Byte-bounded Least Recently Used cache.

use std::collections::HashMap;
use std::fmt;

use crate::cache::ByteView;

/// Callback invoked with every entry evicted by the size policy.
pub type OnEvicted = Box<dyn FnMut(&str, &ByteView) + Send>;

// == Node ==
/// One slot of the recency list.
#[derive(Debug)]
struct Node {
    key: String,
    value: ByteView,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Cache ==
/// Tracks entries in access order and evicts by total byte size.
///
/// Entries live in a slab of nodes linked into a doubly linked list:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// The tracked size is the sum of `key.len() + value.len()` over all
/// entries. After every `add`, the oldest entries are evicted until the
/// size fits `max_bytes`. A budget of zero means unbounded.
pub struct LruCache {
    /// Byte budget, 0 = unbounded
    max_bytes: usize,
    /// Bytes currently tracked
    nbytes: usize,
    /// Key to slab index
    index: HashMap<String, usize>,
    /// Node slab
    nodes: Vec<Node>,
    head: Option<usize>,
    tail: Option<usize>,
    on_evicted: Option<OnEvicted>,
}

impl LruCache {
    // == Constructor ==
    /// Creates an empty cache with the given byte budget.
    ///
    /// # Arguments
    /// * `max_bytes` - Maximum tracked size, 0 disables eviction
    /// * `on_evicted` - Optional callback for evicted entries
    pub fn new(max_bytes: usize, on_evicted: Option<OnEvicted>) -> Self {
        Self {
            max_bytes,
            nbytes: 0,
            index: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
            on_evicted,
        }
    }

    // == Get ==
    /// Looks up a key and marks it as most recently used.
    pub fn get(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        self.move_to_front(idx);
        Some(self.nodes[idx].value.clone())
    }

    // == Add ==
    /// Inserts or replaces a value, then evicts until the budget holds.
    ///
    /// A single entry larger than the budget is evicted right away.
    pub fn add(&mut self, key: impl Into<String>, value: ByteView) {
        let key = key.into();

        if let Some(&idx) = self.index.get(&key) {
            self.move_to_front(idx);
            let node = &mut self.nodes[idx];
            self.nbytes = self.nbytes + value.len() - node.value.len();
            node.value = value;
        } else {
            self.nbytes += key.len() + value.len();
            let idx = self.nodes.len();
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.push_front(idx);
            self.index.insert(key, idx);
        }

        while self.max_bytes != 0 && self.nbytes > self.max_bytes {
            if self.remove_oldest().is_none() {
                break;
            }
        }
    }

    // == Remove Oldest ==
    /// Evicts the least recently used entry, if any.
    ///
    /// Runs the eviction callback and returns the evicted pair.
    pub fn remove_oldest(&mut self) -> Option<(String, ByteView)> {
        let idx = self.tail?;
        let node = self.remove_node(idx);

        if let Some(on_evicted) = self.on_evicted.as_mut() {
            on_evicted(&node.key, &node.value);
        }

        Some((node.key, node.value))
    }

    // == Remove ==
    /// Removes a key without running the eviction callback.
    pub fn remove(&mut self, key: &str) -> Option<ByteView> {
        let idx = *self.index.get(key)?;
        Some(self.remove_node(idx).value)
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the tracked size in bytes.
    pub fn nbytes(&self) -> usize {
        self.nbytes
    }

    // == List Plumbing ==
    fn move_to_front(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return;
        }
        self.unlink(idx);
        self.push_front(idx);
    }

    fn push_front(&mut self, idx: usize) {
        self.nodes[idx].prev = None;
        self.nodes[idx].next = self.head;
        match self.head {
            Some(head) => self.nodes[head].prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    /// Unlinks and takes a node out of the slab, keeping indices dense.
    fn remove_node(&mut self, idx: usize) -> Node {
        self.unlink(idx);
        let node = self.nodes.swap_remove(idx);
        self.index.remove(&node.key);
        self.nbytes -= node.key.len() + node.value.len();

        // The former last node now sits at `idx`; repoint its neighbours.
        if idx < self.nodes.len() {
            let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
            match prev {
                Some(p) => self.nodes[p].next = Some(idx),
                None => self.head = Some(idx),
            }
            match next {
                Some(n) => self.nodes[n].prev = Some(idx),
                None => self.tail = Some(idx),
            }
            if let Some(slot) = self.index.get_mut(&self.nodes[idx].key) {
                *slot = idx;
            }
        }

        node
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut cursor = self.head;
        while let Some(idx) = cursor {
            keys.push(self.nodes[idx].key.clone());
            cursor = self.nodes[idx].next;
        }
        keys
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("max_bytes", &self.max_bytes)
            .field("nbytes", &self.nbytes)
            .field("len", &self.nodes.len())
            .finish()
    }
}
