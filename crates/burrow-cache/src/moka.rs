use async_trait::async_trait;
use burrow_core::{CacheEntry, ShortCode, UrlCache};
use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::trace;
use typed_builder::TypedBuilder;

use crate::Result;

#[derive(Debug, Clone)]
struct Slot {
    entry: CacheEntry,
    ttl: Option<Duration>,
}

/// Expires each slot after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Slot> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, slot: &Slot, _created_at: Instant) -> Option<Duration> {
        slot.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        slot: &Slot,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        slot.ttl
    }
}

/// An in-process cache implementation using Moka.
///
/// Suitable for single instance deployments. Unlike a time-to-live set on the
/// whole cache, the TTL passed to [`UrlCache::set_url`] is honored per entry.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, Slot>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::from(MokaUrlCacheSettings::default())
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::from(
            MokaUrlCacheSettings::builder()
                .max_capacity(max_capacity)
                .build(),
        )
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> MokaUrlCacheSettingsBuilder {
        MokaUrlCacheSettings::builder()
    }

    /// Number of live entries, after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`MokaUrlCache`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MokaUrlCacheSettings {
    /// Maximum number of entries the cache can hold.
    #[builder(default = 10_000)]
    max_capacity: u64,
    /// Evicts entries that are not read for this long, regardless of TTL.
    #[builder(default, setter(strip_option))]
    tti: Option<Duration>,
}

impl Default for MokaUrlCacheSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<MokaUrlCacheSettings> for MokaUrlCache {
    fn from(settings: MokaUrlCacheSettings) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(settings.max_capacity)
            .expire_after(PerEntryTtl);

        if let Some(tti) = settings.tti {
            builder = builder.time_to_idle(tti);
        }

        MokaUrlCache {
            cache: builder.build(),
        }
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CacheEntry>> {
        let slot = self.cache.get(code.as_str()).await;
        trace!(code = %code, hit = slot.is_some(), "Moka lookup");
        Ok(slot.map(|slot| slot.entry))
    }

    async fn set_url(
        &self,
        code: &ShortCode,
        entry: &CacheEntry,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let slot = Slot {
            entry: entry.clone(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), slot).await;
        trace!(code = %code, ?ttl, "Cached entry in Moka");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        self.cache.invalidate(code.as_str()).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;

    fn entry(url: &str) -> CacheEntry {
        CacheEntry {
            short_url: "abc123".to_string(),
            long_url: url.to_string(),
            created_at: Timestamp::from_second(1_700_000_000).unwrap(),
        }
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    #[tokio::test]
    async fn get_and_set() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache
            .set_url(&c, &entry("https://example.com"), None)
            .await
            .unwrap();

        assert_eq!(
            cache.get_url(&c).await.unwrap(),
            Some(entry("https://example.com"))
        );
    }

    #[tokio::test]
    async fn set_overwrites() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.set_url(&c, &entry("https://one.example"), None).await.unwrap();
        cache.set_url(&c, &entry("https://two.example"), None).await.unwrap();

        let got = cache.get_url(&c).await.unwrap().unwrap();
        assert_eq!(got.long_url, "https://two.example");
    }

    #[tokio::test]
    async fn del_removes_entry_and_is_idempotent() {
        let cache = MokaUrlCache::new();
        let c = code("abc123");

        cache.set_url(&c, &entry("https://example.com"), None).await.unwrap();
        cache.del(&c).await.unwrap();
        assert!(cache.get_url(&c).await.unwrap().is_none());

        cache.del(&c).await.unwrap();
    }

    #[tokio::test]
    async fn entry_expires_after_its_own_ttl() {
        let cache = MokaUrlCache::new();
        let short = code("short");
        let long = code("long");

        cache
            .set_url(&short, &entry("https://example.com"), Some(Duration::from_millis(50)))
            .await
            .unwrap();
        cache
            .set_url(&long, &entry("https://example.com"), Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(cache.get_url(&short).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(cache.get_url(&short).await.unwrap().is_none());
        assert!(cache.get_url(&long).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn capacity_is_bounded() {
        let cache = MokaUrlCache::with_capacity(10);

        for i in 0..100 {
            cache
                .set_url(&code(&format!("code{i}")), &entry("https://example.com"), None)
                .await
                .unwrap();
        }

        assert!(cache.entry_count().await <= 10);
    }
}
