use crate::error::CacheError;
use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// The cached projection of a [`UrlRecord`].
///
/// Serialized as `{"shortUrl": .., "longUrl": .., "createdAt": <RFC 3339>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub short_url: String,
    pub long_url: String,
    pub created_at: Timestamp,
}

impl From<&UrlRecord> for CacheEntry {
    fn from(record: &UrlRecord) -> Self {
        Self {
            short_url: record.short_code.to_string(),
            long_url: record.long_url.clone(),
            created_at: record.created_at,
        }
    }
}

/// A cache for URL records.
///
/// This trait provides a domain-specific caching abstraction for [`CacheEntry`]s,
/// using [`ShortCode`] as the key. Implementations can use Redis, in-memory
/// caches, or other storage backends.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get URL entry from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache or has expired.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CacheEntry>>;

    /// Store URL entry in cache with optional TTL.
    ///
    /// If `ttl` is `None`, the entry may persist indefinitely or use
    /// a default expiration policy depending on the implementation.
    async fn set_url(&self, code: &ShortCode, entry: &CacheEntry, ttl: Option<Duration>)
        -> Result<()>;

    /// Remove URL entry from cache.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, code: &ShortCode) -> Result<()>;
}
