//! Cache Module
//!
//! In-memory caching with LRU eviction and lazy TTL expiration.

mod entry;
mod lru;
mod shared;
mod stats;
mod store;


// Re-export public types
pub use shared::LruTtlCache;
pub use stats::CacheStats;
pub use store::CacheStore;
