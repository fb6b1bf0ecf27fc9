use std::sync::Arc;

use crate::redirector::{Redirector, Resolution, Resolved};
use crate::stats::StatsAccumulator;
use crate::{RedirectorError, Result};
use async_trait::async_trait;
use burrow_cache::CacheStore;
use burrow_core::{ReadRepository, ShortCode};
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Reads go through the cache first; the repository is only consulted on a
/// miss, after which the cache is repopulated. Cache trouble is absorbed by
/// the [`CacheStore`] and never fails a resolution.
pub struct RedirectorService<R> {
    repository: Arc<R>,
    cache: CacheStore,
    stats: StatsAccumulator,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: self.cache.clone(),
            stats: self.stats.clone(),
        }
    }
}

impl<R: ReadRepository> RedirectorService<R> {
    pub fn new(repository: Arc<R>, cache: CacheStore, stats: StatsAccumulator) -> Self {
        Self {
            repository,
            cache,
            stats,
        }
    }

    async fn lookup(&self, code: &ShortCode) -> Result<Resolved> {
        if let Some(entry) = self.cache.get(code).await {
            debug!(code = %code, "cache hit");
            return Ok(Resolved {
                long_url: entry.long_url,
                resolution: Resolution::CacheHit,
            });
        }

        let Some(record) = self.repository.get(code).await? else {
            trace!(code = %code, "short code not found");
            return Err(RedirectorError::NotFound(code.to_string()));
        };

        debug!(code = %code, url = %record.long_url, "cache miss, resolved from store");
        self.cache.populate(&record).await;

        Ok(Resolved {
            long_url: record.long_url,
            resolution: Resolution::CacheMiss,
        })
    }
}

#[async_trait]
impl<R: ReadRepository> Redirector for RedirectorService<R> {
    async fn resolve(&self, code: &ShortCode) -> Result<Resolved> {
        let resolved = self.lookup(code).await?;
        self.stats.record_hit(code.clone());
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsWorker;
    use burrow_cache::{CacheStoreSettings, MokaUrlCache, UrlCache};
    use burrow_core::{
        CacheEntry, CacheError, HitRecorder, Repository, StorageError, UrlRecord,
    };
    use burrow_storage::InMemoryRepository;
    use jiff::Timestamp;
    use std::time::Duration;

    struct Harness {
        service: RedirectorService<InMemoryRepository>,
        repository: Arc<InMemoryRepository>,
        worker: StatsWorker,
    }

    impl Harness {
        fn new(cache: Arc<dyn UrlCache>, ttl: Duration) -> Self {
            let repository = Arc::new(InMemoryRepository::new());
            let (stats, worker) = StatsAccumulator::start(repository.clone());
            let store = CacheStore::new(cache, CacheStoreSettings::builder().ttl(ttl).build());

            Self {
                service: RedirectorService::new(repository.clone(), store, stats),
                repository,
                worker,
            }
        }

        fn with_moka() -> Self {
            Self::new(Arc::new(MokaUrlCache::new()), Duration::from_secs(3600))
        }

        async fn insert(&self, code: &str, url: &str) {
            self.repository
                .insert(&UrlRecord::new(ShortCode::new_unchecked(code), url, Timestamp::now()))
                .await
                .unwrap();
        }

        /// Stops the stats worker and returns the stored record.
        async fn finish(self, code: &str) -> UrlRecord {
            let Self {
                service,
                repository,
                worker,
            } = self;
            drop(service);
            worker.join().await;
            repository
                .get(&ShortCode::new_unchecked(code))
                .await
                .unwrap()
                .unwrap()
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl UrlCache for BrokenCache {
        async fn get_url(&self, _: &ShortCode) -> burrow_cache::Result<Option<CacheEntry>> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn set_url(
            &self,
            _: &ShortCode,
            _: &CacheEntry,
            _: Option<Duration>,
        ) -> burrow_cache::Result<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }

        async fn del(&self, _: &ShortCode) -> burrow_cache::Result<()> {
            Err(CacheError::Unavailable("down".to_string()))
        }
    }

    struct UnavailableStore;

    #[async_trait]
    impl ReadRepository for UnavailableStore {
        async fn get(&self, _: &ShortCode) -> burrow_core::repository::Result<Option<UrlRecord>> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn exists(&self, _: &ShortCode) -> burrow_core::repository::Result<bool> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl HitRecorder for UnavailableStore {
        async fn record_hit(
            &self,
            _: &ShortCode,
            _: Timestamp,
        ) -> burrow_core::repository::Result<bool> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let h = Harness::with_moka();
        h.insert("abc123", "https://example.com").await;

        let first = h.service.resolve(&code("abc123")).await.unwrap();
        let second = h.service.resolve(&code("abc123")).await.unwrap();

        assert_eq!(first.resolution, Resolution::CacheMiss);
        assert_eq!(second.resolution, Resolution::CacheHit);
        assert_eq!(first.long_url, "https://example.com");
        assert_eq!(second.long_url, first.long_url);
    }

    #[tokio::test]
    async fn entry_is_missed_again_after_ttl() {
        let h = Harness::new(Arc::new(MokaUrlCache::new()), Duration::from_millis(50));
        h.insert("abc123", "https://example.com").await;

        let first = h.service.resolve(&code("abc123")).await.unwrap();
        let second = h.service.resolve(&code("abc123")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let third = h.service.resolve(&code("abc123")).await.unwrap();

        assert_eq!(first.resolution, Resolution::CacheMiss);
        assert_eq!(second.resolution, Resolution::CacheHit);
        assert_eq!(third.resolution, Resolution::CacheMiss);
        assert_eq!(third.long_url, first.long_url);
    }

    #[tokio::test]
    async fn unknown_code_is_not_found() {
        let h = Harness::with_moka();

        let err = h.service.resolve(&code("nope")).await.unwrap_err();

        assert!(matches!(err, RedirectorError::NotFound(c) if c == "nope"));
    }

    #[tokio::test]
    async fn k_redirects_add_k_clicks() {
        let h = Harness::with_moka();
        h.insert("hot", "https://example.com").await;

        for _ in 0..7 {
            h.service.resolve(&code("hot")).await.unwrap();
        }

        let record = h.finish("hot").await;
        assert_eq!(record.clicks, 7);
        assert!(record.last_accessed.is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn clicks_show_up_without_awaiting_the_worker() {
        let h = Harness::with_moka();
        h.insert("abc", "https://example.com").await;

        h.service.resolve(&code("abc")).await.unwrap();

        let repository = h.repository.clone();
        awaitility::at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(10))
            .until_async(move || {
                let repository = repository.clone();
                async move {
                    repository
                        .get(&ShortCode::new_unchecked("abc"))
                        .await
                        .unwrap()
                        .is_some_and(|record| record.clicks == 1)
                }
            })
            .await;
    }

    #[tokio::test]
    async fn misses_do_not_count() {
        let h = Harness::with_moka();
        h.insert("abc", "https://example.com").await;

        let _ = h.service.resolve(&code("other")).await;

        assert_eq!(h.finish("abc").await.clicks, 0);
    }

    #[tokio::test]
    async fn failing_cache_is_transparent() {
        let h = Harness::new(Arc::new(BrokenCache), Duration::from_secs(3600));
        h.insert("abc", "https://example.com").await;

        for _ in 0..3 {
            let resolved = h.service.resolve(&code("abc")).await.unwrap();
            assert_eq!(resolved.long_url, "https://example.com");
            assert_eq!(resolved.resolution, Resolution::CacheMiss);
        }

        assert_eq!(h.finish("abc").await.clicks, 3);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_storage_error() {
        let repository = Arc::new(UnavailableStore);
        let (stats, worker) = StatsAccumulator::start(repository.clone());
        let service = RedirectorService::new(repository, CacheStore::disabled(), stats);

        let err = service.resolve(&code("abc")).await.unwrap_err();
        assert!(matches!(err, RedirectorError::Storage(StorageError::Unavailable(_))));

        drop(service);
        assert_eq!(worker.join().await, 0);
    }
}
