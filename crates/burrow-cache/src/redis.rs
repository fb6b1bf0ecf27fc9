use async_trait::async_trait;
use burrow_core::{CacheEntry, CacheError, ShortCode, UrlCache};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::Result;

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Entries are stored as JSON strings under `<prefix><code>`, using
/// `SET ... EX` when a TTL is given.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

/// TTL in whole milliseconds for `SET ... PX`, which rejects zero.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache using [`DEFAULT_KEY_PREFIX`].
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Connects to `url` and verifies the server answers `PING`.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        let cache = Self::with_prefix(conn, key_prefix);
        cache.ping().await?;
        info!(prefix = %cache.key_prefix, "connected to Redis");
        Ok(cache)
    }

    /// Round-trips a `PING` to the server.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| map_redis_error("failed to ping Redis", e))
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Generates the cache key for a short code.
    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CacheEntry>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching URL entry from Redis cache");

        let mut conn = self.conn.clone();
        let cached = conn
            .get::<_, Option<String>>(&key)
            .await
            .map_err(|e| map_redis_error("failed to fetch value from Redis", e))?;

        let Some(cached) = cached else {
            trace!(code = %code, "Cache miss in Redis");
            return Ok(None);
        };

        debug!(code = %code, "Cache hit in Redis");
        serde_json::from_str::<CacheEntry>(&cached)
            .map(Some)
            .map_err(|e| {
                warn!(code = %code, error = %e, "Failed to deserialize cached entry");
                CacheError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
            })
    }

    async fn set_url(
        &self,
        code: &ShortCode,
        entry: &CacheEntry,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, "Storing URL entry in Redis cache");

        let json = serde_json::to_string(entry).map_err(|e| {
            CacheError::Serialization(format!("failed to serialize cache value: {e}"))
        })?;

        let mut conn = self.conn.clone();
        let result = match ttl {
            Some(ttl) => conn.pset_ex::<_, _, ()>(&key, json, ttl_millis(ttl)).await,
            None => conn.set::<_, _, ()>(&key, json).await,
        };

        result.map_err(|e| map_redis_error("failed to write value to Redis", e))?;
        debug!(code = %code, "Cached entry in Redis");
        Ok(())
    }

    async fn del(&self, code: &ShortCode) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, "Removing URL entry from Redis cache");

        let mut conn = self.conn.clone();
        conn.del::<_, ()>(&key)
            .await
            .map_err(|e| map_redis_error("failed to delete value from Redis", e))
    }
}
