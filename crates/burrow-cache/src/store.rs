use burrow_core::{CacheEntry, CacheError, ShortCode, UrlCache, UrlRecord};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{trace, warn};
use typed_builder::TypedBuilder;

use crate::Result;

/// Knobs for a [`CacheStore`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct CacheStoreSettings {
    /// Lifetime of every entry written through the store.
    #[builder(default = Duration::from_secs(3600))]
    pub ttl: Duration,
    /// Upper bound on a single cache round trip.
    #[builder(default = Duration::from_millis(250))]
    pub timeout: Duration,
}

impl Default for CacheStoreSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Best-effort front for a [`UrlCache`] backend.
///
/// Cache failures never reach callers: errors and calls that exceed the
/// timeout are logged and reported as a miss (for reads) or ignored (for
/// writes), so a dead cache only costs latency up to the timeout.
#[derive(Clone)]
pub struct CacheStore {
    cache: Arc<dyn UrlCache>,
    settings: CacheStoreSettings,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    pub fn new(cache: Arc<dyn UrlCache>, settings: CacheStoreSettings) -> Self {
        Self { cache, settings }
    }

    /// A store over [`NullUrlCache`](crate::NullUrlCache); every read misses.
    pub fn disabled() -> Self {
        Self::new(Arc::new(crate::NullUrlCache), CacheStoreSettings::default())
    }

    pub fn settings(&self) -> &CacheStoreSettings {
        &self.settings
    }

    /// Looks up `code`, treating any failure as a miss.
    pub async fn get(&self, code: &ShortCode) -> Option<CacheEntry> {
        match self.bounded(self.cache.get_url(code)).await {
            Ok(entry) => {
                trace!(code = %code, hit = entry.is_some(), "cache lookup");
                entry
            }
            Err(err) => {
                warn!(code = %code, error = %err, "cache read failed, treating as miss");
                None
            }
        }
    }

    /// Caches `entry` under `code` for the configured TTL.
    pub async fn set(&self, code: &ShortCode, entry: &CacheEntry) {
        self.set_with_ttl(code, entry, self.settings.ttl).await
    }

    pub async fn set_with_ttl(&self, code: &ShortCode, entry: &CacheEntry, ttl: Duration) {
        if let Err(err) = self
            .bounded(self.cache.set_url(code, entry, Some(ttl)))
            .await
        {
            warn!(code = %code, error = %err, "cache write failed, ignoring");
        }
    }

    /// Caches the projection of a freshly read or written record.
    pub async fn populate(&self, record: &UrlRecord) {
        self.set(&record.short_code, &CacheEntry::from(record)).await
    }

    /// Drops any cached entry for `code`.
    pub async fn delete(&self, code: &ShortCode) {
        if let Err(err) = self.bounded(self.cache.del(code)).await {
            warn!(code = %code, error = %err, "cache delete failed, ignoring");
        }
    }

    async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.settings.timeout, op)
            .await
            .unwrap_or_else(|_| {
                Err(CacheError::Timeout(format!(
                    "no reply within {:?}",
                    self.settings.timeout
                )))
            })
    }
}
