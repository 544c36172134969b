//! Optimistic cache mutation.
//!
//! An [`OptimisticUpdate`] snapshots a cache entry, writes the speculative
//! value immediately and then either keeps it ([`commit`](OptimisticUpdate::commit))
//! or restores the snapshot ([`revert`](OptimisticUpdate::revert)). An update
//! dropped without either is reverted.

use tracing::debug;

use super::{CacheKey, QueryCache};

/// A pending speculative write to a [`QueryCache`].
#[must_use = "an optimistic update reverts when dropped without commit"]
pub struct OptimisticUpdate<'a, V: Clone> {
    cache: &'a QueryCache<V>,
    key: CacheKey,
    snapshot: Option<V>,
    settled: bool,
}

impl<'a, V: Clone> OptimisticUpdate<'a, V> {
    /// Snapshots `key` and stores `apply(current)` in its place.
    pub fn apply(cache: &'a QueryCache<V>, key: CacheKey, apply: impl FnOnce(Option<V>) -> V) -> Self {
        let snapshot = cache.peek(&key);
        cache.insert(key.clone(), apply(snapshot.clone()));
        Self {
            cache,
            key,
            snapshot,
            settled: false,
        }
    }

    /// The value before the update.
    pub fn snapshot(&self) -> Option<&V> {
        self.snapshot.as_ref()
    }

    /// Keeps the speculative value.
    pub fn commit(mut self) {
        self.settled = true;
    }

    /// Restores the snapshot.
    pub fn revert(mut self) {
        self.restore();
        self.settled = true;
    }

    fn restore(&self) {
        debug!(key = %self.key, "Rolling back optimistic update");
        match &self.snapshot {
            Some(previous) => {
                self.cache.insert(self.key.clone(), previous.clone());
            }
            None => {
                self.cache.remove(&self.key);
            }
        }
    }
}

impl<V: Clone> Drop for OptimisticUpdate<'_, V> {
    fn drop(&mut self) {
        if !self.settled {
            self.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> CacheKey {
        CacheKey::record("pins", "me")
    }

    #[test]
    fn test_apply_writes_speculative_value() {
        let cache = QueryCache::new(4);
        cache.insert(key(), 1u32);

        let update = OptimisticUpdate::apply(&cache, key(), |v| v.unwrap_or(0) + 1);

        assert_eq!(cache.peek(&key()), Some(2));
        assert_eq!(update.snapshot(), Some(&1));
        update.commit();
        assert_eq!(cache.peek(&key()), Some(2));
    }

    #[test]
    fn test_revert_restores_snapshot() {
        let cache = QueryCache::new(4);
        cache.insert(key(), 1u32);

        let update = OptimisticUpdate::apply(&cache, key(), |_| 99);
        update.revert();

        assert_eq!(cache.peek(&key()), Some(1));
    }

    #[test]
    fn test_revert_of_new_entry_removes_it() {
        let cache: QueryCache<u32> = QueryCache::new(4);

        let update = OptimisticUpdate::apply(&cache, key(), |_| 7);
        assert_eq!(cache.peek(&key()), Some(7));
        update.revert();

        assert!(cache.peek(&key()).is_none());
    }

    #[test]
    fn test_drop_without_commit_reverts() {
        let cache = QueryCache::new(4);
        cache.insert(key(), vec!["a".to_string()]);

        {
            let _update = OptimisticUpdate::apply(&cache, key(), |v| {
                let mut items = v.unwrap_or_default();
                items.push("b".to_string());
                items
            });
            assert_eq!(cache.peek(&key()).map(|v| v.len()), Some(2));
        }

        assert_eq!(cache.peek(&key()), Some(vec!["a".to_string()]));
    }
}
