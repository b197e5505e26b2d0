//! Cache Entry Module
//!
//! Defines the two halves of a tracked key: the ordering-list node carrying
//! its expiration time, and the table entry carrying its value.

use std::time::{Duration, Instant};

use super::lru::NodeId;

/// Longest lifetime an entry can be given. Larger TTLs are clamped to it so
/// that `now + ttl` is always representable and computed the same way.
pub const MAX_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 100);

// == Node ==
/// Element of the ordering list: a tracked key and its absolute expiration.
#[derive(Debug, Clone)]
pub struct Node<K> {
    /// The tracked key
    pub key: K,
    /// Monotonic instant after which the key must no longer be served
    pub expires_at: Instant,
}

impl<K> Node<K> {
    // == Constructor ==
    /// Creates a node expiring `ttl` after `now`.
    pub fn new(key: K, now: Instant, ttl: Duration) -> Self {
        Self {
            key,
            expires_at: expiry_from(now, ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the node has expired at `now`.
    ///
    /// Boundary condition: a node is expired once `now` reaches
    /// `expires_at`, so a zero TTL expires on the next sweep.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Refresh ==
    /// Resets the expiration to `ttl` after `now`.
    pub fn refresh(&mut self, now: Instant, ttl: Duration) {
        self.expires_at = expiry_from(now, ttl);
    }
}

// == Entry ==
/// Entry table value: the stored value and the id of its ordering-list node.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    /// The stored value
    pub value: V,
    /// Handle of the owning node in the ordering list
    pub node: NodeId,
}

impl<V> Entry<V> {
    pub fn new(value: V, node: NodeId) -> Self {
        Self { value, node }
    }
}

// == Utility Functions ==
/// Computes `now + ttl` with `ttl` clamped to [`MAX_TTL`].
fn expiry_from(now: Instant, ttl: Duration) -> Instant {
    now + ttl.min(MAX_TTL)
}
