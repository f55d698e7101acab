//! Intrusive doubly-linked LRU list over a slab arena.
//!
//! Gives O(1) touch-to-front, insert, and evict-from-tail, which a plain
//! `HashMap` plus a `Vec` recency order cannot. No existing dependency in
//! the corpus provides this (`indexmap`, used elsewhere in the pack, does
//! not support O(1) move-to-front), so it is hand-rolled here — this is
//! exactly the kind of data structure the spec calls "real engineering".

use std::collections::HashMap;

struct Node {
    key: String,
    size: u64,
    dirty: bool,
    prev: Option<usize>,
    next: Option<usize>,
}

/// An LRU-ordered key set tracking per-key byte size and dirtiness.
///
/// The front of the list (`head`) is the most-recently-used key; the back
/// (`tail`) is the least-recently-used, i.e. the next eviction candidate.
pub(super) struct LruList {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
    total_size: u64,
}

impl LruList {
    pub(super) fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
            total_size: 0,
        }
    }

    pub(super) fn len(&self) -> usize {
        self.index.len()
    }

    pub(super) fn total_size(&self) -> u64 {
        self.total_size
    }

    pub(super) fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub(super) fn size_of(&self, key: &str) -> Option<u64> {
        self.index.get(key).map(|&i| self.nodes[i].size)
    }

    pub(super) fn is_dirty(&self, key: &str) -> bool {
        self.index
            .get(key)
            .map(|&i| self.nodes[i].dirty)
            .unwrap_or(false)
    }

    pub(super) fn keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    pub(super) fn dirty_keys(&self) -> Vec<String> {
        self.index
            .keys()
            .filter(|k| self.is_dirty(k))
            .cloned()
            .collect()
    }

    /// Insert or update `key` with `size` and `dirty`, moving it to MRU.
    /// Returns the previous size, if `key` was already present.
    pub(super) fn insert_mru(&mut self, key: &str, size: u64, dirty: bool) -> Option<u64> {
        if let Some(&i) = self.index.get(key) {
            let old_size = self.nodes[i].size;
            self.total_size = self.total_size - old_size + size;
            self.nodes[i].size = size;
            self.nodes[i].dirty = dirty;
            self.move_to_front(i);
            Some(old_size)
        } else {
            let node = Node {
                key: key.to_string(),
                size,
                dirty,
                prev: None,
                next: self.head,
            };
            let i = if let Some(free) = self.free.pop() {
                self.nodes[free] = node;
                free
            } else {
                self.nodes.push(node);
                self.nodes.len() - 1
            };
            if let Some(old_head) = self.head {
                self.nodes[old_head].prev = Some(i);
            }
            self.head = Some(i);
            if self.tail.is_none() {
                self.tail = Some(i);
            }
            self.index.insert(key.to_string(), i);
            self.total_size += size;
            None
        }
    }

    /// Move `key` to MRU without changing its size or dirtiness.
    pub(super) fn touch(&mut self, key: &str) {
        if let Some(&i) = self.index.get(key) {
            self.move_to_front(i);
        }
    }

    pub(super) fn mark_clean(&mut self, key: &str) {
        if let Some(&i) = self.index.get(key) {
            self.nodes[i].dirty = false;
        }
    }

    /// Remove `key` entirely. Returns its `(size, dirty)` if it was present.
    pub(super) fn remove(&mut self, key: &str) -> Option<(u64, bool)> {
        let i = self.index.remove(key)?;
        self.unlink(i);
        let node = &self.nodes[i];
        let result = (node.size, node.dirty);
        self.total_size -= node.size;
        self.free.push(i);
        Some(result)
    }

    /// Remove and return the least-recently-used entry's `(key, size, dirty)`.
    pub(super) fn pop_lru(&mut self) -> Option<(String, u64, bool)> {
        let i = self.tail?;
        let key = self.nodes[i].key.clone();
        let (size, dirty) = self.remove(&key)?;
        Some((key, size, dirty))
    }

    fn move_to_front(&mut self, i: usize) {
        if self.head == Some(i) {
            return;
        }
        self.unlink(i);
        self.nodes[i].prev = None;
        self.nodes[i].next = self.head;
        if let Some(old_head) = self.head {
            self.nodes[old_head].prev = Some(i);
        }
        self.head = Some(i);
        if self.tail.is_none() {
            self.tail = Some(i);
        }
    }

    fn unlink(&mut self, i: usize) {
        let prev = self.nodes[i].prev;
        let next = self.nodes[i].next;
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[i].prev = None;
        self.nodes[i].next = None;
    }
}
