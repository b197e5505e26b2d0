//! Cache Store Module
//!
//! Main cache engine combining the entry table with the ordering list.
//! Every operation first sweeps expired entries off the front of the list,
//! then performs its own structural change on both structures together.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tracing::{debug, error, trace};

use crate::cache::entry::{Entry, Node, MAX_TTL};
use crate::cache::lru::OrderingList;
use crate::cache::CacheStats;
use crate::dump::CacheSnapshot;
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Unsynchronized LRU + TTL cache engine.
///
/// Requires `&mut self` for every lookup because a hit refreshes the entry's
/// TTL and promotes it in LRU order. Wrap it in [`crate::LruTtlCache`] to
/// share it between threads.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key to (value, list node) table
    entries: HashMap<K, Entry<V>>,
    /// Touch order, which is also expiry order
    order: OrderingList<K>,
    /// Activity counters
    stats: CacheStats,
    /// Maximum number of tracked keys
    capacity: usize,
    /// Lifetime of an entry after its most recent touch
    ttl: Duration,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a store holding at most `capacity` entries, each living `ttl`
    /// after its most recent touch. TTLs above 100 years are clamped.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(capacity));
        }

        Ok(Self {
            entries: HashMap::with_capacity(capacity),
            order: OrderingList::with_capacity(capacity),
            stats: CacheStats::new(),
            capacity,
            ttl: ttl.min(MAX_TTL),
        })
    }

    // == Push ==
    /// Stores `value` under `key` as the most recently used entry.
    ///
    /// If the cache is full, the least recently used entry is evicted first.
    /// An existing entry for `key` is replaced outright, resetting its TTL.
    pub fn push(&mut self, key: K, value: V) {
        self.push_at(key, value, Instant::now());
    }

    pub(crate) fn push_at(&mut self, key: K, value: V, now: Instant) {
        self.sweep(now);

        if self.entries.len() >= self.capacity {
            self.evict_front();
        }

        if let Some(old) = self.entries.remove(&key) {
            if self.order.remove(old.node).is_none() {
                corrupted("replaced entry has no list node");
            }
        }

        let node = self.order.push_back(Node::new(key.clone(), now, self.ttl));
        self.entries.insert(key, Entry::new(value, node));
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns a clone of the value stored under `key`.
    ///
    /// A hit is a touch: the entry's TTL restarts and it becomes the most
    /// recently used. Expired entries are never returned.
    pub fn get<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at<Q>(&mut self, key: &Q, now: Instant) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.sweep(now);

        let entry = match self.entries.get(key) {
            Some(entry) => entry,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        match self.order.get_mut(entry.node) {
            Some(node) => node.refresh(now, self.ttl),
            None => corrupted("entry refers to a freed list node"),
        }
        self.order.move_to_back(entry.node);
        self.stats.record_hit();
        Some(entry.value.clone())
    }

    // == Remove ==
    /// Removes `key`, returning whether a live entry was present.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_at(key, Instant::now())
    }

    pub(crate) fn remove_at<Q>(&mut self, key: &Q, now: Instant) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.sweep(now);

        let Some(entry) = self.entries.remove(key) else {
            return false;
        };
        if self.order.remove(entry.node).is_none() {
            corrupted("removed entry has no list node");
        }

        self.stats.record_removal();
        self.stats.set_total_entries(self.entries.len());
        true
    }

    // == Purge Expired ==
    /// Runs the expiration sweep on its own.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        self.sweep(Instant::now())
    }

    #[cfg(test)]
    pub(crate) fn purge_expired_at(&mut self, now: Instant) -> usize {
        self.sweep(now)
    }

    // == Length ==
    /// Returns the number of tracked entries as of the last sweep.
    ///
    /// May include entries whose TTL has lapsed since; call
    /// [`purge_expired`](Self::purge_expired) first for an exact live count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Snapshot ==
    /// Captures the current contents in LRU order for diagnostics.
    ///
    /// Does not sweep: entries whose TTL lapsed since the last operation are
    /// included and flagged as expired.
    pub fn snapshot(&self) -> CacheSnapshot<K, V>
    where
        V: Clone,
    {
        let now = Instant::now();
        let rows = self.order.iter().filter_map(|(_, node)| {
            self.entries
                .get(&node.key)
                .map(|entry| (node.key.clone(), entry.value.clone(), node.expires_at))
        });
        CacheSnapshot::capture(self.capacity, self.ttl, now, rows)
    }

    // == Check Invariants ==
    /// Verifies the table and the list describe the same set of keys, the
    /// size bound, and the list's linkage and expiry order.
    ///
    /// # Errors
    /// Returns [`CacheError::Internal`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        self.order.validate().map_err(CacheError::Internal)?;

        if self.entries.len() != self.order.len() {
            return Err(CacheError::Internal(format!(
                "table has {} entries but list has {} nodes",
                self.entries.len(),
                self.order.len()
            )));
        }
        if self.entries.len() > self.capacity {
            return Err(CacheError::Internal(format!(
                "{} entries exceed capacity {}",
                self.entries.len(),
                self.capacity
            )));
        }

        for (id, node) in self.order.iter() {
            match self.entries.get(&node.key) {
                Some(entry) if entry.node == id => {}
                Some(_) => {
                    return Err(CacheError::Internal(
                        "table entry points at a different node".to_string(),
                    ))
                }
                None => {
                    return Err(CacheError::Internal(
                        "list node has no table entry".to_string(),
                    ))
                }
            }
        }
        Ok(())
    }

    // == Internal Helpers ==
    /// Drops expired entries from the front of the list.
    ///
    /// Expirations never decrease from front to back, so the walk stops at
    /// the first live node.
    fn sweep(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while self
            .order
            .front()
            .is_some_and(|node| node.is_expired_at(now))
        {
            let Some(node) = self.order.pop_front() else {
                break;
            };
            if self.entries.remove(&node.key).is_none() {
                corrupted("expired list node has no table entry");
            }
            removed += 1;
        }

        if removed > 0 {
            self.stats.record_expirations(removed);
            self.stats.set_total_entries(self.entries.len());
            trace!(removed, remaining = self.entries.len(), "swept expired entries");
        }
        removed
    }

    /// Evicts the least recently used entry.
    fn evict_front(&mut self) {
        let Some(node) = self.order.pop_front() else {
            return;
        };
        if self.entries.remove(&node.key).is_none() {
            corrupted("evicted list node has no table entry");
        }
        self.stats.record_eviction();
        debug!(
            capacity = self.capacity,
            "evicted least recently used entry"
        );
    }
}

/// Reports an engine invariant violation and aborts the operation.
///
/// The table and the list are out of sync; carrying on would serve corrupt
/// data, so this fails loudly instead of reporting a miss.
#[cold]
fn corrupted(context: &str) -> ! {
    error!(context, "cache invariant violated");
    panic!("cache invariant violated: {context}");
}
