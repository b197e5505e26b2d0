//! Ordering List Module
//!
//! Doubly linked list of tracked keys ordered by last touch. The list is the
//! single source of both LRU order and expiry order.
//!
//! Nodes live in a slot arena and are linked by index, so handles stay
//! stable across unrelated insertions and removals and every operation
//! except iteration is O(1).
//!
//! ```text
//!   front (least recently touched, earliest expiry)
//!     [a] <-> [b] <-> [c]
//!                       back (most recently touched, latest expiry)
//! ```

use std::time::Instant;

use super::entry::Node;

// == Node Id ==
/// Stable handle to a node in an [`OrderingList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Slot<K> {
    node: Node<K>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

// == Ordering List ==
/// Tracks touch order for LRU eviction and expiry sweeps.
///
/// - Front = least recently touched
/// - Back = most recently touched
#[derive(Debug)]
pub struct OrderingList<K> {
    slots: Vec<Option<Slot<K>>>,
    free: Vec<usize>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    len: usize,
}

impl<K> OrderingList<K> {
    // == Constructor ==
    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Length ==
    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Accessors ==
    /// Returns the node for `id`, if it is still linked.
    pub fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.slot(id).map(|slot| &slot.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K>> {
        self.slot_mut(id).map(|slot| &mut slot.node)
    }

    /// Returns the least recently touched node.
    pub fn front(&self) -> Option<&Node<K>> {
        self.head.and_then(|id| self.get(id))
    }

    #[cfg(test)]
    pub fn front_id(&self) -> Option<NodeId> {
        self.head
    }

    /// Returns the most recently touched node.
    #[cfg(test)]
    pub fn back(&self) -> Option<&Node<K>> {
        self.tail.and_then(|id| self.get(id))
    }

    #[cfg(test)]
    pub fn back_id(&self) -> Option<NodeId> {
        self.tail
    }

    // == Push Back ==
    /// Links `node` at the back and returns its handle.
    pub fn push_back(&mut self, node: Node<K>) -> NodeId {
        let slot = Slot {
            node,
            prev: self.tail,
            next: None,
        };
        let id = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                NodeId(idx)
            }
            None => {
                self.slots.push(Some(slot));
                NodeId(self.slots.len() - 1)
            }
        };

        match self.tail.and_then(|tail| self.slot_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
        id
    }

    // == Remove ==
    /// Unlinks the node and frees its slot.
    ///
    /// Returns `None` if `id` is not linked.
    pub fn remove(&mut self, id: NodeId) -> Option<Node<K>> {
        self.slot(id)?;
        self.detach(id);
        let slot = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(slot.node)
    }

    // == Pop Front ==
    /// Unlinks and returns the least recently touched node.
    pub fn pop_front(&mut self) -> Option<Node<K>> {
        let id = self.head?;
        self.remove(id)
    }

    // == Move To Back ==
    /// Relinks the node at the back. Returns `false` if `id` is not linked.
    pub fn move_to_back(&mut self, id: NodeId) -> bool {
        if self.slot(id).is_none() {
            return false;
        }
        if self.tail == Some(id) {
            return true;
        }

        self.detach(id);
        let old_tail = self.tail;
        if let Some(slot) = self.slot_mut(id) {
            slot.prev = old_tail;
            slot.next = None;
        }
        match old_tail.and_then(|tail| self.slot_mut(tail)) {
            Some(tail) => tail.next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        true
    }

    // == Iteration ==
    /// Iterates nodes from front (LRU) to back (MRU).
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    // == Validate ==
    /// Walks the links and checks them against the slot bookkeeping.
    ///
    /// Also checks that expirations never decrease from front to back.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut count = 0;
        let mut prev: Option<NodeId> = None;
        let mut last_expiry: Option<Instant> = None;
        let mut current = self.head;

        while let Some(id) = current {
            let slot = self
                .slot(id)
                .ok_or_else(|| format!("link to free slot {}", id.0))?;
            if slot.prev != prev {
                return Err(format!("broken back link at slot {}", id.0));
            }
            if let Some(last) = last_expiry {
                if slot.node.expires_at < last {
                    return Err(format!("expiry order violated at slot {}", id.0));
                }
            }
            last_expiry = Some(slot.node.expires_at);
            count += 1;
            if count > self.len {
                return Err("cycle detected".to_string());
            }
            prev = Some(id);
            current = slot.next;
        }

        if prev != self.tail {
            return Err("tail does not match last linked node".to_string());
        }
        if count != self.len {
            return Err(format!("linked {} nodes but len is {}", count, self.len));
        }
        Ok(())
    }

    // == Internal Helpers ==
    fn slot(&self, id: NodeId) -> Option<&Slot<K>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot<K>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Unlinks `id` from its neighbours without freeing it.
    fn detach(&mut self, id: NodeId) {
        let (prev, next) = match self.slot(id) {
            Some(slot) => (slot.prev, slot.next),
            None => return,
        };

        match prev.and_then(|p| self.slot_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.slot_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`OrderingList`].
pub struct Iter<'a, K> {
    list: &'a OrderingList<K>,
    current: Option<NodeId>,
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = (NodeId, &'a Node<K>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let slot = self.list.slot(id)?;
        self.current = slot.next;
        Some((id, &slot.node))
    }
}
