//! Diagnostic Dump
//!
//! Point-in-time listing of cache contents for logging and debugging.
//! A snapshot is never swept and may include entries whose TTL has lapsed
//! since the last cache operation; it must not be used for correctness.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;

/// One tracked key as seen by a snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry<K, V> {
    pub key: K,
    pub value: V,
    /// Wall-clock time at which the entry expires
    pub expires_at: DateTime<Utc>,
    /// Remaining lifetime in milliseconds, 0 once expired
    pub ttl_remaining_ms: u64,
    /// Whether the TTL had already lapsed when the snapshot was taken
    pub expired: bool,
}

/// Cache contents in LRU order, front (next to evict) first.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot<K, V> {
    pub capacity: usize,
    pub ttl_ms: u64,
    pub taken_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry<K, V>>,
}

impl<K, V> CacheSnapshot<K, V> {
    /// Builds a snapshot from `(key, value, expires_at)` rows in list order.
    pub(crate) fn capture<I>(capacity: usize, ttl: Duration, now: Instant, rows: I) -> Self
    where
        I: IntoIterator<Item = (K, V, Instant)>,
    {
        let taken_at = Utc::now();
        let entries = rows
            .into_iter()
            .map(|(key, value, expires_at)| {
                let remaining = expires_at.saturating_duration_since(now);
                SnapshotEntry {
                    key,
                    value,
                    expires_at: wall_clock(expires_at, now, taken_at),
                    ttl_remaining_ms: millis(remaining),
                    expired: now >= expires_at,
                }
            })
            .collect();

        Self {
            capacity,
            ttl_ms: millis(ttl),
            taken_at,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String>
    where
        K: Serialize,
        V: Serialize,
    {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for CacheSnapshot<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "LRU TTL cache: {}/{} entries, ttl {}ms, taken at {}",
            self.entries.len(),
            self.capacity,
            self.ttl_ms,
            self.taken_at.to_rfc3339()
        )?;
        for (position, entry) in self.entries.iter().enumerate() {
            write!(
                f,
                "  #{} key={:?} value={:?} expires_at={} ttl_remaining={}ms",
                position,
                entry.key,
                entry.value,
                entry.expires_at.to_rfc3339(),
                entry.ttl_remaining_ms
            )?;
            if entry.expired {
                write!(f, " (expired)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// == Utility Functions ==
/// Maps a monotonic instant onto the wall clock relative to `wall_now`.
fn wall_clock(at: Instant, now: Instant, wall_now: DateTime<Utc>) -> DateTime<Utc> {
    if at >= now {
        chrono::Duration::from_std(at - now)
            .ok()
            .and_then(|d| wall_now.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    } else {
        chrono::Duration::from_std(now - at)
            .ok()
            .and_then(|d| wall_now.checked_sub_signed(d))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
