//! LRU List Module
//!
//! Recency-ordered storage for cache entries with O(1) move-to-front.

use crate::cache::{CacheEntry, EntryHandle};

// == Node ==
#[derive(Debug)]
struct Node {
    entry: CacheEntry,
    generation: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU List ==
/// Doubly-linked list of entries threaded through a slot vector.
///
/// - Front (head) = Most recently used
/// - Back (tail) = Least recently used
///
/// Freed slots are reused. Every node gets a fresh generation number, so a
/// handle to an evicted node never matches whatever later lands in its slot.
#[derive(Debug, Default)]
pub struct LruList {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    next_generation: u64,
}

impl LruList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self::default()
    }

    // == Push Front ==
    /// Adds an entry at the most-recently-used position.
    pub fn push_front(&mut self, entry: CacheEntry) -> EntryHandle {
        let generation = self.next_generation;
        self.next_generation += 1;

        let node = Node {
            entry,
            generation,
            prev: None,
            next: self.head,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        match self.head {
            Some(old_head) => self.node_mut(old_head).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
        self.len += 1;

        EntryHandle { slot, generation }
    }

    // == Get ==
    /// Returns the entry behind a handle, or None if the handle is stale.
    pub fn get(&self, handle: EntryHandle) -> Option<&CacheEntry> {
        self.live(handle).map(|slot| &self.node(slot).entry)
    }

    // == Move To Front ==
    /// Marks an entry as most recently used.
    ///
    /// Returns false if the handle is stale. Relinks in place; the payload
    /// is never touched.
    pub fn move_to_front(&mut self, handle: EntryHandle) -> bool {
        let Some(slot) = self.live(handle) else {
            return false;
        };
        if self.head == Some(slot) {
            return true;
        }
        self.unlink(slot);
        self.link_front(slot);
        true
    }

    // == Remove ==
    /// Removes the entry behind a handle.
    pub fn remove(&mut self, handle: EntryHandle) -> Option<CacheEntry> {
        let slot = self.live(handle)?;
        Some(self.take(slot))
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    pub fn pop_back(&mut self) -> Option<CacheEntry> {
        let slot = self.tail?;
        Some(self.take(slot))
    }

    // == Peek Back ==
    /// Returns the least recently used entry without removing it.
    pub fn peek_back(&self) -> Option<&CacheEntry> {
        self.tail.map(|slot| &self.node(slot).entry)
    }

    // == Is Front ==
    pub fn is_front(&self, handle: EntryHandle) -> bool {
        self.live(handle).is_some() && self.head == Some(handle.slot)
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iterate ==
    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    // == Internals ==
    fn live(&self, handle: EntryHandle) -> Option<usize> {
        match self.slots.get(handle.slot) {
            Some(Some(node)) if node.generation == handle.generation => Some(handle.slot),
            _ => None,
        }
    }

    fn node(&self, slot: usize) -> &Node {
        self.slots[slot]
            .as_ref()
            .unwrap_or_else(|| unreachable!("linked slot {slot} is vacant"))
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node {
        self.slots[slot]
            .as_mut()
            .unwrap_or_else(|| unreachable!("linked slot {slot} is vacant"))
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
    }

    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(old_head) => self.node_mut(old_head).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn take(&mut self, slot: usize) -> CacheEntry {
        self.unlink(slot);
        let node = self.slots[slot]
            .take()
            .unwrap_or_else(|| unreachable!("linked slot {slot} is vacant"));
        self.free.push(slot);
        self.len -= 1;
        node.entry
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a> {
    list: &'a LruList,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a CacheEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.node(slot);
        self.cursor = node.next;
        Some(&node.entry)
    }
}
