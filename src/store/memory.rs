use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

struct CacheValue<V> {
    value: Arc<V>,
    expires_at: Option<Instant>,
}

impl<V> CacheValue<V> {
    fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|expiry| Instant::now() < expiry)
    }
}

/// Single-slot in-memory cache holding one shared value with an optional TTL.
///
/// Values are handed out as `Arc`s and replaced whole on `put`, so a reader
/// holds either the old value or the new one, never a mix.
pub struct MemoryCache<V>
where
    V: Send + Sync + 'static,
{
    inner: RwLock<Option<CacheValue<V>>>,
}

impl<V> MemoryCache<V>
where
    V: Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(None),
        }
    }

    /// Returns the cached value if it has not expired.
    pub async fn get(&self) -> Option<Arc<V>> {
        let cache = self.inner.read().await;
        match cache.as_ref() {
            Some(entry) if entry.is_fresh() => {
                debug!("Cache HIT");
                Some(Arc::clone(&entry.value))
            }
            Some(_) => {
                debug!("Cache entry expired");
                None
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, value: Arc<V>, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut cache = self.inner.write().await;
        debug!("Cache PUT");
        *cache = Some(CacheValue { value, expires_at });
    }
}

impl<V> Default for MemoryCache<V>
where
    V: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<i32>::new();

        assert!(cache.get().await.is_none());

        cache.put(Arc::new(123), None).await;
        assert_eq!(cache.get().await.as_deref(), Some(&123));

        cache.put(Arc::new(456), None).await;
        assert_eq!(cache.get().await.as_deref(), Some(&456));
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<i32>::new();

        cache.put(Arc::new(123), Some(Duration::from_millis(10))).await;
        assert_eq!(cache.get().await.as_deref(), Some(&123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get().await.is_none());

        cache.put(Arc::new(456), Some(Duration::from_secs(60))).await;
        assert_eq!(cache.get().await.as_deref(), Some(&456));
    }

    #[tokio::test]
    async fn test_readers_keep_their_snapshot() {
        let cache = MemoryCache::<Vec<i32>>::new();
        cache.put(Arc::new(vec![1, 2, 3]), None).await;

        let snapshot = cache.get().await.unwrap();
        cache.put(Arc::new(vec![4, 5, 6]), None).await;

        assert_eq!(*snapshot, vec![1, 2, 3]);
        assert_eq!(*cache.get().await.unwrap(), vec![4, 5, 6]);
    }
}
