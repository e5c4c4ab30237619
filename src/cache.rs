//! Time-to-live cache shared by the upstream clients.

use std::{hash::Hash, time::Duration};

use dashmap::DashMap;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Key/value store whose entries expire a fixed duration after insertion.
///
/// Expiry is lazy: an entry past its deadline is dropped the next time it is read.
/// There is no size bound and no background sweep.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store `value` under `key`, replacing any previous entry, expiring after `ttl`.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Return the value for `key` unless it is missing or expired. Expired entries are removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        match self.entries.get(key) {
            None => return None,
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => {}
        }

        self.entries
            .remove_if(key, |_, entry| entry.expires_at <= now);
        None
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn returns_value_within_ttl() {
        let cache = TtlCache::new();
        cache.set("k", 7, Duration::from_secs(30));

        advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get(&"k"), Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_absent_and_removed() {
        let cache = TtlCache::new();
        cache.set("k", 7, Duration::from_secs(30));

        advance(Duration::from_secs(30)).await;
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_value_and_expiry() {
        let cache = TtlCache::new();
        cache.set("k", 1, Duration::from_secs(5));
        advance(Duration::from_secs(4)).await;
        cache.set("k", 2, Duration::from_secs(5));
        advance(Duration::from_secs(4)).await;

        assert_eq!(cache.get(&"k"), Some(2));
    }

    #[test]
    fn missing_key_is_absent() {
        let cache: TtlCache<String, u32> = TtlCache::new();
        assert_eq!(cache.get(&"nope".to_string()), None);
    }
}
