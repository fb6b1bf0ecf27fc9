use crate::Result;
use async_trait::async_trait;
use burrow_core::{CacheEntry, ShortCode, UrlCache};
use std::time::Duration;

/// A cache that stores nothing.
///
/// Used when caching is disabled or the configured backend could not be
/// reached at startup. Every lookup is a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullUrlCache;

#[async_trait]
impl UrlCache for NullUrlCache {
    async fn get_url(&self, _code: &ShortCode) -> Result<Option<CacheEntry>> {
        Ok(None)
    }

    async fn set_url(
        &self,
        _code: &ShortCode,
        _entry: &CacheEntry,
        _ttl: Option<Duration>,
    ) -> Result<()> {
        Ok(())
    }

    async fn del(&self, _code: &ShortCode) -> Result<()> {
        Ok(())
    }
}
