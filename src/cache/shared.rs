//! Shared Cache Handle
//!
//! Thread-safe front for [`CacheStore`]. Every call holds one exclusive
//! lock for its whole duration, so the expiration sweep, the membership
//! check and the structural change happen as a single critical section.
//! There is no read lock: a hit mutates recency and TTL.

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::dump::CacheSnapshot;
use crate::error::Result;

// == LRU TTL Cache ==
/// In-process key-value cache with LRU eviction and lazy TTL expiration.
///
/// Share it across threads or tasks with `Arc<LruTtlCache<K, V>>`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use lru_ttl_cache::LruTtlCache;
///
/// let cache = LruTtlCache::new(2, Duration::from_secs(60)).unwrap();
/// cache.push(1, "one");
/// cache.push(2, "two");
/// cache.push(3, "three");
///
/// assert_eq!(cache.get(&1), None);
/// assert_eq!(cache.get(&2), Some("two"));
/// ```
#[derive(Debug)]
pub struct LruTtlCache<K, V> {
    inner: Mutex<CacheStore<K, V>>,
}

impl<K, V> LruTtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructors ==
    /// Creates a cache holding at most `capacity` entries, each expiring
    /// `ttl` after its most recent touch.
    ///
    /// # Errors
    /// Returns [`crate::CacheError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        let store = CacheStore::new(capacity, ttl)?;
        let ttl_ms = u64::try_from(store.ttl().as_millis()).unwrap_or(u64::MAX);
        debug!(capacity, ttl_ms, "cache created");
        Ok(Self {
            inner: Mutex::new(store),
        })
    }

    /// Creates a cache from a validated [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.capacity, config.ttl)
    }

    // == Operations ==
    /// Stores `value` under `key`, replacing any previous entry and making it
    /// the most recently used. Evicts the least recently used entry when full.
    pub fn push(&self, key: K, value: V) {
        self.inner.lock().push(key, value);
    }

    /// Returns the value for `key` and refreshes its TTL and recency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.inner.lock().get(key)
    }

    /// Removes `key`. Returns `false` if it was absent or already expired.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.lock().remove(key)
    }

    /// Number of tracked entries as of the last sweep.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Sweeps expired entries now and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.inner.lock().purge_expired()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn ttl(&self) -> Duration {
        self.inner.lock().ttl()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    // == Diagnostics ==
    /// Copies the current contents, in LRU order, for inspection.
    pub fn snapshot(&self) -> CacheSnapshot<K, V>
    where
        V: Clone,
    {
        self.inner.lock().snapshot()
    }

    /// Logs the current contents at debug level.
    pub fn dump(&self)
    where
        K: std::fmt::Debug,
        V: Clone + std::fmt::Debug,
    {
        let snapshot = self.snapshot();
        debug!("{}", snapshot);
    }

    /// Verifies the engine's internal invariants.
    pub fn check_invariants(&self) -> Result<()> {
        self.inner.lock().check_invariants()
    }
}
