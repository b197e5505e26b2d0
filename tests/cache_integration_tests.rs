//! Integration Tests for the public cache API
//!
//! Exercises `LruTtlCache` end to end: eviction and expiry scenarios,
//! multi-threaded access, sharing across async tasks, and the diagnostic dump.

use std::sync::{Arc, Once};
use std::thread::{self, sleep};
use std::time::Duration;

use lru_ttl_cache::{CacheConfig, CacheError, LruTtlCache};
use serde_json::Value;

// == Helper Functions ==

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "lru_ttl_cache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

fn long_lived<V: Clone>(capacity: usize) -> LruTtlCache<i32, V> {
    init_tracing();
    LruTtlCache::new(capacity, Duration::from_secs(60)).unwrap()
}

// == Scenario Tests ==

#[test]
fn test_capacity_two_evicts_first_key() {
    let cache = long_lived(2);

    cache.push(1, "one");
    cache.push(2, "two");
    cache.push(3, "three");

    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), Some("two"));
    assert_eq!(cache.get(&3), Some("three"));
}

#[test]
fn test_short_ttl_expires_entry() {
    init_tracing();
    let cache = LruTtlCache::new(10, Duration::from_millis(100)).unwrap();

    cache.push(1, "one");
    sleep(Duration::from_millis(200));

    assert_eq!(cache.get(&1), None);
    assert!(cache.is_empty());
}

#[test]
fn test_replace_keeps_single_entry() {
    let cache = long_lived(3);

    cache.push(1, "one");
    cache.push(1, "new one");

    assert_eq!(cache.get(&1), Some("new one"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_lru_order_follows_reads() {
    let cache = long_lived(2);

    cache.push(1, "one");
    cache.push(2, "two");
    cache.push(3, "three"); // evicts 1

    cache.get(&2);
    cache.push(4, "four"); // evicts 3, not 2

    assert_eq!(cache.get(&3), None);
    assert_eq!(cache.get(&2), Some("two"));
    assert_eq!(cache.get(&4), Some("four"));
}

#[test]
fn test_ttl_refresh_on_get() {
    init_tracing();
    let ttl = Duration::from_millis(200);
    let cache = LruTtlCache::new(3, ttl).unwrap();

    cache.push(1, "one");
    sleep(ttl / 2);

    // Touch halfway through the TTL
    assert_eq!(cache.get(&1), Some("one"));
    sleep(ttl * 3 / 4);

    // Past the original expiry, within the refreshed one
    assert_eq!(cache.get(&1), Some("one"));

    sleep(ttl * 2);
    assert_eq!(cache.get(&1), None);
}

#[test]
fn test_push_sweeps_expired_entries() {
    init_tracing();
    let ttl = Duration::from_millis(100);
    let cache = LruTtlCache::new(10, ttl).unwrap();

    cache.push(1, "one");
    cache.push(2, "two");
    sleep(ttl * 2);

    cache.push(3, "three");
    assert_eq!(cache.len(), 1);

    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.get(&2), None);
    assert_eq!(cache.get(&3), Some("three"));

    let stats = cache.stats();
    assert_eq!(stats.expirations, 2);
    assert_eq!(stats.evictions, 0);
}

#[test]
fn test_remove() {
    let cache = long_lived(3);

    cache.push(1, "one");
    assert!(cache.remove(&1));
    assert_eq!(cache.get(&1), None);

    // Non-existent key
    assert!(!cache.remove(&2));
    assert!(cache.is_empty());
}

#[test]
fn test_purge_gives_exact_live_count() {
    init_tracing();
    let ttl = Duration::from_millis(50);
    let cache = LruTtlCache::new(4, ttl).unwrap();

    cache.push("a", 1);
    cache.push("b", 2);
    sleep(ttl * 2);

    // Nothing has swept since the TTL lapsed
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.purge_expired(), 2);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_string_keys_borrowed_lookup() {
    init_tracing();
    let cache: LruTtlCache<String, u32> = LruTtlCache::new(4, Duration::from_secs(60)).unwrap();

    cache.push("alpha".to_string(), 1);
    assert_eq!(cache.get("alpha"), Some(1));
    assert!(cache.remove("alpha"));
}

// == Construction Tests ==

#[test]
fn test_zero_capacity_rejected() {
    let result = LruTtlCache::<i32, i32>::new(0, Duration::from_secs(1));
    assert!(matches!(result, Err(CacheError::InvalidCapacity(0))));
}

#[test]
fn test_from_config() -> anyhow::Result<()> {
    let config = CacheConfig::new(2, Duration::from_secs(30));
    let cache = LruTtlCache::from_config(&config)?;

    cache.push(1, 10);
    cache.push(2, 20);
    cache.push(3, 30);

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);
    Ok(())
}

// == Concurrency Tests ==

#[test]
fn test_concurrent_access() {
    let cache_size = 100;
    let cache = Arc::new(long_lived::<i32>(cache_size));
    let mut handles = Vec::new();

    // Concurrent writers
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for j in 0..cache_size as i32 {
                cache.push(j, j);
                cache.get(&j);
            }
        }));
    }

    // Concurrent readers
    for _ in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for j in 0..cache_size as i32 {
                cache.get(&j);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    assert!(cache.len() <= cache_size);
    assert!(cache.check_invariants().is_ok());

    // Verify no corrupted entries
    for j in 0..cache_size as i32 {
        if let Some(value) = cache.get(&j) {
            assert_eq!(value, j, "cache corruption detected for key {}", j);
        }
    }
}

#[test]
fn test_concurrent_eviction_and_removal() {
    init_tracing();
    let cache = Arc::new(LruTtlCache::new(8, Duration::from_millis(5)).unwrap());
    let mut handles = Vec::new();

    for worker in 0..8u64 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for j in 0..500u64 {
                let key = (worker * 7 + j) % 32;
                match j % 4 {
                    0 | 1 => cache.push(key, key * 2),
                    2 => {
                        if let Some(value) = cache.get(&key) {
                            assert_eq!(value, key * 2);
                        }
                    }
                    _ => {
                        cache.remove(&key);
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }

    assert!(cache.len() <= 8);
    assert!(cache.check_invariants().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_across_tokio_tasks() {
    init_tracing();
    let cache = Arc::new(LruTtlCache::new(64, Duration::from_secs(60)).unwrap());
    let mut tasks = Vec::new();

    for task in 0..16u32 {
        let cache = Arc::clone(&cache);
        tasks.push(tokio::spawn(async move {
            for j in 0..32u32 {
                cache.push(task * 100 + j, format!("{}-{}", task, j));
                tokio::task::yield_now().await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(cache.len(), 64);
    assert!(cache.check_invariants().is_ok());
    for entry in cache.snapshot().entries {
        assert_eq!(entry.value, format!("{}-{}", entry.key / 100, entry.key % 100));
    }
}

// == Diagnostic Dump Tests ==

#[test]
fn test_snapshot_json_dump() -> anyhow::Result<()> {
    let cache = long_lived(3);

    cache.push(1, "one".to_string());
    cache.push(2, "two".to_string());
    cache.get(&1);
    cache.dump();

    let json: Value = serde_json::from_str(&cache.snapshot().to_json()?)?;
    assert_eq!(json["capacity"], 3);
    assert_eq!(json["ttl_ms"], 60_000);

    let entries = json["entries"].as_array().expect("entries array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], 2);
    assert_eq!(entries[1]["key"], 1);
    assert_eq!(entries[1]["value"], "one");
    assert_eq!(entries[1]["expired"], false);
    Ok(())
}

#[test]
fn test_snapshot_listing() {
    let cache = long_lived(2);
    cache.push(7, "seven");

    let listing = cache.snapshot().to_string();
    assert!(listing.contains("1/2 entries"));
    assert!(listing.contains("key=7 value=\"seven\""));
}
