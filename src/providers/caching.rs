use crate::core::error::FxError;
use crate::core::rates::{RateProvider, RateSource, RateTable};
use crate::store::MemoryCache;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Process-wide cache in front of a [`RateProvider`].
///
/// Readers get a shared `Arc<RateTable>` snapshot. Fetches are serialized by a
/// single writer lock and the cached table is replaced whole, never patched.
/// A failed fetch leaves the previous table in the cache.
pub struct CachingRateProvider<T: RateProvider> {
    inner: T,
    cache: MemoryCache<RateTable>,
    ttl: Duration,
    writer: Mutex<()>,
}

impl<T: RateProvider> CachingRateProvider<T> {
    pub fn new(inner: T, ttl: Duration) -> Self {
        Self {
            inner,
            cache: MemoryCache::new(),
            ttl,
            writer: Mutex::new(()),
        }
    }

    async fn fetch_and_store(&self) -> Result<Arc<RateTable>, FxError> {
        let table = Arc::new(self.inner.fetch_rates().await?);
        self.cache.put(Arc::clone(&table), Some(self.ttl)).await;
        Ok(table)
    }
}

#[async_trait]
impl<T: RateProvider> RateSource for CachingRateProvider<T> {
    /// Returns the cached table while it is fresh, fetching a new one otherwise.
    async fn rates(&self) -> Result<Arc<RateTable>, FxError> {
        if let Some(cached) = self.cache.get().await {
            return Ok(cached);
        }

        let _guard = self.writer.lock().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(cached) = self.cache.get().await {
            return Ok(cached);
        }
        debug!("Cache miss for rate table");
        self.fetch_and_store().await
    }

    /// Fetches a new table regardless of the cached one's age.
    async fn refresh(&self) -> Result<Arc<RateTable>, FxError> {
        let _guard = self.writer.lock().await;
        debug!("Forced refresh of rate table");
        self.fetch_and_store().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::BASE_CURRENCY;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct MockInnerProvider {
        call_count: AtomicUsize,
        fail: AtomicBool,
    }

    impl MockInnerProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl<'a> RateProvider for &'a MockInnerProvider {
        async fn fetch_rates(&self) -> Result<RateTable, FxError> {
            let call = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(FxError::fetch("mock", "timeout"));
            }
            // Every currency carries the call number so a mixed table is detectable.
            let mut table = RateTable::new(BASE_CURRENCY, None);
            for code in ["USD", "JPY", "GBP", "CHF"] {
                table.insert(code, call as f64)?;
            }
            Ok(table)
        }
    }

    #[tokio::test]
    async fn test_rates_are_cached() {
        let inner = MockInnerProvider::new();
        let provider = CachingRateProvider::new(&inner, Duration::from_secs(3600));

        let first = provider.rates().await.unwrap();
        assert_eq!(first.get("USD"), Some(1.0));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);

        let second = provider.rates().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_rates_are_refetched() {
        let inner = MockInnerProvider::new();
        let provider = CachingRateProvider::new(&inner, Duration::from_millis(10));

        provider.rates().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let table = provider.rates().await.unwrap();

        assert_eq!(table.get("USD"), Some(2.0));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_bypasses_cache() {
        let inner = MockInnerProvider::new();
        let provider = CachingRateProvider::new(&inner, Duration::from_secs(3600));

        let old = provider.rates().await.unwrap();
        let new = provider.refresh().await.unwrap();

        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
        assert_eq!(old.get("USD"), Some(1.0));
        assert_eq!(new.get("USD"), Some(2.0));
        assert!(Arc::ptr_eq(&new, &provider.rates().await.unwrap()));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_table() {
        let inner = MockInnerProvider::new();
        let provider = CachingRateProvider::new(&inner, Duration::from_secs(3600));

        let original = provider.rates().await.unwrap();
        inner.fail.store(true, Ordering::SeqCst);

        let err = provider.refresh().await.unwrap_err();
        assert!(matches!(err, FxError::Fetch { .. }));

        let current = provider.rates().await.unwrap();
        assert!(Arc::ptr_eq(&original, &current));
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_without_cache_surfaces_error() {
        let inner = MockInnerProvider::new();
        inner.fail.store(true, Ordering::SeqCst);
        let provider = CachingRateProvider::new(&inner, Duration::from_secs(3600));

        assert!(provider.rates().await.is_err());
        assert!(provider.cache.get().await.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_readers_never_see_mixed_tables() {
        let inner: &'static MockInnerProvider = Box::leak(Box::new(MockInnerProvider::new()));
        let provider = Arc::new(CachingRateProvider::new(inner, Duration::from_secs(3600)));
        provider.rates().await.unwrap();

        let writer = {
            let provider = Arc::clone(&provider);
            tokio::spawn(async move {
                for _ in 0..50 {
                    provider.refresh().await.unwrap();
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let table = provider.rates().await.unwrap();
                        let generation = table.get("USD").unwrap();
                        for code in ["JPY", "GBP", "CHF"] {
                            assert_eq!(table.get(code), Some(generation));
                        }
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
        assert_eq!(inner.call_count.load(Ordering::SeqCst), 51);
    }
}
