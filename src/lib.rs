//! LRU TTL Cache - an in-process key-value cache
//!
//! Bounds the number of entries with least-recently-used eviction and drops
//! entries whose time-to-live has lapsed. Expiration is lazy: it happens
//! at the start of the next operation, never on a background timer.

pub mod cache;
pub mod config;
pub mod dump;
pub mod error;

pub use cache::{CacheStats, CacheStore, LruTtlCache};
pub use config::CacheConfig;
pub use dump::{CacheSnapshot, SnapshotEntry};
pub use error::{CacheError, Result};
