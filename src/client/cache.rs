//! Client-side query cache.
//!
//! LRU cache of list and detail responses keyed by resource type and query.
//! Mutations invalidate every entry of the resource they touched so the next
//! read refetches. Thread-safe with parking_lot RwLock; atomic hit/miss counters.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use parking_lot::RwLock;
use tracing::debug;

use super::ListQuery;

/// Identifies one cached response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Resource type, e.g. `"projects"`.
    pub resource: String,
    /// Normalised query or record id.
    pub query: String,
}

impl CacheKey {
    /// Key of a list request.
    pub fn list(resource: &str, query: &ListQuery) -> Self {
        Self {
            resource: resource.to_string(),
            query: query.cache_key(),
        }
    }

    /// Key of a single record.
    pub fn record(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            query: format!("id={}", id),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.resource, self.query)
    }
}

/// LRU cache of backend responses.
pub struct QueryCache<V> {
    cache: RwLock<LruCache<CacheKey, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> QueryCache<V> {
    /// Creates a cache holding at most `capacity` responses (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Stores a response, returning the value it replaced.
    pub fn insert(&self, key: CacheKey, value: V) -> Option<V> {
        self.cache.write().put(key, value)
    }

    /// Returns a cached response.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut cache = self.cache.write();
        match cache.get(key) {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Returns a cached response without touching recency or counters.
    pub fn peek(&self, key: &CacheKey) -> Option<V> {
        self.cache.read().peek(key).cloned()
    }

    /// Removes one entry.
    pub fn remove(&self, key: &CacheKey) -> Option<V> {
        self.cache.write().pop(key)
    }

    /// Drops every entry of `resource`, returning how many were removed.
    pub fn invalidate(&self, resource: &str) -> usize {
        let mut cache = self.cache.write();
        let stale: Vec<CacheKey> = cache
            .iter()
            .filter(|(key, _)| key.resource == resource)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            cache.pop(key);
        }
        debug!(resource, removed = stale.len(), "Invalidated cached queries");
        stale.len()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.cache.write().clear();
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let cache = self.cache.read();
        CacheStats {
            size: cache.len(),
            capacity: cache.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<V> fmt::Debug for QueryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("len", &self.cache.read().len())
            .finish()
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently stored.
    pub size: usize,
    /// Maximum number of entries.
    pub capacity: usize,
    /// Lookups that found an entry.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
}
