//! Bounded, time-expiring result cache.
//!
//! True LRU with lazy TTL expiry: a `get` hit re-inserts the entry at the
//! youngest position; an expired entry is only discovered (and removed) when
//! touched, or swept in bulk by `prune`. Capacity overflow evicts the single
//! least-recently-used entry. All mutation happens under one mutex so readers
//! never observe a partially-written entry.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;

/// Default entry capacity.
pub const DEFAULT_CAPACITY: usize = 200;

/// Default time-to-live: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Counters exposed for response metadata and maintenance dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub size: usize,
}

struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
    ttl: Duration,
}

impl<T> CacheEntry<T> {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.inserted_at) > self.ttl
    }
}

struct Inner<T> {
    entries: LruCache<String, CacheEntry<T>>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

/// Bounded TTL+LRU cache for computed result lists, keyed by normalized
/// query + limit. Owned exclusively by the search service; callers go through
/// the service API.
pub struct QueryCache<T> {
    inner: Mutex<Inner<T>>,
    default_ttl: Duration,
}

impl<T: Clone> QueryCache<T> {
    /// Cache holding at most `capacity` entries, each live for `ttl` unless
    /// overridden per insert.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            default_ttl: ttl,
        }
    }

    /// Fetch a value. An expired entry is removed and reported as a miss;
    /// a hit re-positions the entry as most-recently-used.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut inner = self.inner.lock();

        if let Some(entry) = inner.entries.peek(key) {
            if entry.expired(Instant::now()) {
                inner.entries.pop(key);
                inner.misses += 1;
                return None;
            }
        }

        match inner.entries.get(key) {
            Some(entry) => {
                let value = entry.value.clone();
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Store a value under `key` with the default TTL. Always lands at the
    /// youngest position; evicts the least-recently-used entry when full.
    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.insert_with_ttl(key, value, self.default_ttl);
    }

    /// Store a value with a per-entry TTL override.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: T, ttl: Duration) {
        let key = key.into();
        let mut inner = self.inner.lock();

        // Re-insertion must land youngest, so drop any existing entry first
        inner.entries.pop(&key);
        if inner.entries.len() == inner.entries.cap().get() {
            inner.evictions += 1;
        }
        inner.entries.put(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Whether a live (non-expired) entry exists, without touching recency.
    pub fn contains(&self, key: &str) -> bool {
        let inner = self.inner.lock();
        inner
            .entries
            .peek(key)
            .is_some_and(|entry| !entry.expired(Instant::now()))
    }

    /// Drop an entry. Returns whether one existed.
    pub fn remove(&self, key: &str) -> bool {
        self.inner.lock().entries.pop(key).is_some()
    }

    /// Drop every entry. Stats counters are kept.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Current keys, most-recently-used first.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Eagerly sweep all expired entries, returning the count removed.
    /// Useful for periodic maintenance without waiting for lazy expiry.
    pub fn prune(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = Instant::now();
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            inner.entries.pop(key);
        }
        expired.len()
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            size: inner.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn cache(capacity: usize) -> QueryCache<String> {
        QueryCache::new(capacity, Duration::from_secs(60))
    }

    #[test]
    fn test_get_miss_then_hit() {
        let c = cache(4);
        assert_eq!(c.get("a"), None);
        c.insert("a", "one".to_string());
        assert_eq!(c.get("a"), Some("one".to_string()));
        let stats = c.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_idempotent_read_within_ttl() {
        let c = cache(4);
        c.insert("k", "value".to_string());
        assert_eq!(c.get("k"), c.get("k"), "back-to-back reads must be identical");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let c = cache(2);
        c.insert("a", "1".to_string());
        c.insert("b", "2".to_string());
        c.insert("c", "3".to_string());
        assert_eq!(c.len(), 2, "size never exceeds capacity");
        assert_eq!(c.get("a"), None, "a was least-recently-used and evicted");
        assert!(c.contains("b"));
        assert!(c.contains("c"));
        assert_eq!(c.stats().evictions, 1);
    }

    #[test]
    fn test_get_refreshes_recency() {
        let c = cache(2);
        c.insert("a", "1".to_string());
        c.insert("b", "2".to_string());
        // Touch "a" so "b" becomes the eviction candidate
        assert!(c.get("a").is_some());
        c.insert("c", "3".to_string());
        assert!(c.contains("a"), "recently-read entry survives");
        assert!(!c.contains("b"), "untouched entry was evicted");
    }

    #[test]
    fn test_reinsert_lands_youngest() {
        let c = cache(2);
        c.insert("a", "1".to_string());
        c.insert("b", "2".to_string());
        c.insert("a", "1-again".to_string());
        c.insert("c", "3".to_string());
        assert!(c.contains("a"), "re-inserted entry is youngest");
        assert!(!c.contains("b"));
        assert_eq!(c.get("a"), Some("1-again".to_string()));
    }

    #[test]
    fn test_ttl_expiry_on_get() {
        let c = QueryCache::new(4, Duration::from_millis(20));
        c.insert("k", "v".to_string());
        sleep(Duration::from_millis(40));
        assert_eq!(c.get("k"), None, "expired entry reads as a miss");
        assert_eq!(c.len(), 0, "expired entry is removed on lookup");
    }

    #[test]
    fn test_per_entry_ttl_override() {
        let c = QueryCache::new(4, Duration::from_secs(60));
        c.insert_with_ttl("fast", "v".to_string(), Duration::from_millis(20));
        c.insert("slow", "v".to_string());
        sleep(Duration::from_millis(40));
        assert_eq!(c.get("fast"), None);
        assert!(c.get("slow").is_some());
    }

    #[test]
    fn test_prune_sweeps_expired() {
        let c = QueryCache::new(8, Duration::from_millis(20));
        c.insert("a", "1".to_string());
        c.insert("b", "2".to_string());
        c.insert_with_ttl("keep", "3".to_string(), Duration::from_secs(60));
        sleep(Duration::from_millis(40));
        assert_eq!(c.prune(), 2);
        assert_eq!(c.keys(), vec!["keep".to_string()]);
    }

    #[test]
    fn test_contains_does_not_touch_recency() {
        let c = cache(2);
        c.insert("a", "1".to_string());
        c.insert("b", "2".to_string());
        assert!(c.contains("a"));
        c.insert("c", "3".to_string());
        assert!(!c.contains("a"), "contains must not refresh recency");
    }

    #[test]
    fn test_clear() {
        let c = cache(4);
        c.insert("a", "1".to_string());
        c.insert("b", "2".to_string());
        c.clear();
        assert!(c.is_empty());
        assert!(c.keys().is_empty());
    }
}
