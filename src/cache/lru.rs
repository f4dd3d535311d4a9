//! LRU Tracker Module
//!
//! Implements least-recently-used tracking for cache eviction.

use std::collections::HashMap;

use crate::cache::CacheKey;

// == Node ==
/// One slot of the recency list.
#[derive(Debug)]
struct Node {
    key: CacheKey,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Tracker ==
/// Tracks access order for LRU eviction.
///
/// Index-addressed: a key map into a slab-backed doubly-linked list, so
/// `touch`, `remove` and `evict_oldest` are all O(1). Head = most
/// recently used, tail = least recently used; insertion order is
/// preserved for entries that are never touched again, which keeps
/// eviction ties stable.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Slab of list nodes; freed slots are recycled
    nodes: Vec<Option<Node>>,
    /// Recycled slot indices
    free: Vec<usize>,
    /// Key to slot index
    index: HashMap<CacheKey, usize>,
    /// Most recently used slot
    head: Option<usize>,
    /// Least recently used slot
    tail: Option<usize>,
}

impl LruTracker {
    // == Constructor ==
    /// Creates a new empty LRU tracker.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    ///
    /// If the key is already tracked it is relinked at the front;
    /// otherwise a new slot is allocated at the front.
    pub fn touch(&mut self, key: &CacheKey) {
        if let Some(&slot) = self.index.get(key) {
            self.unlink(slot);
            self.link_front(slot);
        } else {
            let node = Node {
                key: key.clone(),
                prev: None,
                next: None,
            };
            let slot = match self.free.pop() {
                Some(slot) => {
                    self.nodes[slot] = Some(node);
                    slot
                }
                None => {
                    self.nodes.push(Some(node));
                    self.nodes.len() - 1
                }
            };
            self.index.insert(key.clone(), slot);
            self.link_front(slot);
        }
    }

    // == Remove ==
    /// Removes a key from the tracker. Unknown keys are a no-op.
    pub fn remove(&mut self, key: &CacheKey) {
        if let Some(slot) = self.index.remove(key) {
            self.unlink(slot);
            self.nodes[slot] = None;
            self.free.push(slot);
        }
    }

    // == Evict Oldest ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<CacheKey> {
        let slot = self.tail?;
        let key = self.nodes[slot]
            .as_ref()
            .map(|node| node.key.clone())
            .expect("tail slot must be occupied");
        self.remove(&key);
        Some(key)
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&CacheKey> {
        self.tail
            .and_then(|slot| self.nodes[slot].as_ref())
            .map(|node| &node.key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.index.contains_key(key)
    }

    // == List Plumbing ==
    /// Detaches a slot from the list without freeing it.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.nodes[slot].as_ref().expect("slot must be occupied");
            (node.prev, node.next)
        };

        match prev {
            Some(p) => {
                if let Some(node) = self.nodes[p].as_mut() {
                    node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(node) = self.nodes[n].as_mut() {
                    node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    /// Attaches a detached slot at the front (most recently used).
    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        if let Some(node) = self.nodes[slot].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            if let Some(node) = self.nodes[h].as_mut() {
                node.prev = Some(slot);
            }
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }
}
