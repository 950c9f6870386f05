use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Per-key cache with a time-to-live and a capacity bound
///
/// Entries older than the TTL are never returned. When the map is full,
/// expired entries are purged first; if that frees nothing, the oldest
/// entry is evicted.
#[derive(Debug)]
pub struct KeyedCache<V> {
    inner: RwLock<HashMap<String, (V, Instant)>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> KeyedCache<V> {
    /// Create an empty cache
    ///
    /// A zero `capacity` is treated as one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Configured time-to-live
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, dropping it if it has expired
    pub async fn get(&self, key: &str) -> Option<V> {
        {
            let guard = self.inner.read().await;
            match guard.get(key) {
                Some((value, inserted)) if inserted.elapsed() < self.ttl => {
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict so the next insert has room
        let mut guard = self.inner.write().await;
        if guard
            .get(key)
            .is_some_and(|(_, inserted)| inserted.elapsed() >= self.ttl)
        {
            guard.remove(key);
        }
        None
    }

    /// Insert or replace the value for `key`
    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut guard = self.inner.write().await;

        if !guard.contains_key(&key) && guard.len() >= self.capacity {
            let ttl = self.ttl;
            guard.retain(|_, (_, inserted)| inserted.elapsed() < ttl);

            if guard.len() >= self.capacity {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, (_, inserted))| *inserted)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    guard.remove(&oldest);
                }
            }
        }

        guard.insert(key, (value, Instant::now()));
    }

    /// Number of entries, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_keyed_cache_ttl() {
        let cache = KeyedCache::new(Duration::from_secs(300), 16);

        cache.insert("203.0.113.7", 1u32).await;
        assert_eq!(cache.get("203.0.113.7").await, Some(1));
        assert_eq!(cache.get("198.51.100.1").await, None);

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("203.0.113.7").await, Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("203.0.113.7").await, None);

        // Expired entry was dropped on read
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyed_cache_capacity_evicts_oldest() {
        let cache = KeyedCache::new(Duration::from_secs(300), 2);

        cache.insert("a", 1u32).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("b", 2).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert("c", 3).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, Some(2));
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyed_cache_purges_expired_before_evicting() {
        let cache = KeyedCache::new(Duration::from_secs(10), 2);

        cache.insert("old", 1u32).await;
        tokio::time::advance(Duration::from_secs(5)).await;
        cache.insert("young", 2).await;
        tokio::time::advance(Duration::from_secs(6)).await;

        // "old" is expired and gets purged, "young" survives
        cache.insert("new", 3).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("young").await, Some(2));
        assert_eq!(cache.get("new").await, Some(3));
    }

    #[tokio::test]
    async fn test_replacing_key_does_not_evict() {
        let cache = KeyedCache::new(Duration::from_secs(300), 1);

        cache.insert("a", 1u32).await;
        cache.insert("a", 2).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("a").await, Some(2));
    }
}
