use crate::error::{Result, ShortenerError};
use crate::shortener::{ShortenParams, Shortener};
use async_trait::async_trait;
use burrow_cache::CacheStore;
use burrow_core::{Repository, ShortCode, UrlRecord};
use burrow_generator::Generator;
use jiff::{Timestamp, Unit};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// A concrete implementation of the [`Shortener`] trait.
///
/// This service wraps a [`Repository`], a [`Generator`] and a [`CacheStore`]
/// to handle:
/// - URL validation
/// - Short code generation (auto-generated or custom)
/// - Record insertion and cache warm-up
///
/// Uniqueness is decided by the repository alone. A rejected insert is
/// reported as a conflict and is never retried or overwritten.
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    cache: CacheStore,
}

impl<R, G> Clone for ShortenerService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            cache: self.cache.clone(),
        }
    }
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    pub fn new(repository: Arc<R>, generator: G, cache: CacheStore) -> Self {
        Self {
            repository,
            generator: Arc::new(generator),
            cache,
        }
    }

    /// Validates that the URL is absolute and uses http or https.
    ///
    /// The stored value is later sent verbatim as a `Location` header, so
    /// whitespace and control characters are rejected outright rather than
    /// left for [`Url::parse`] to strip.
    fn validate_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidUrl("URL cannot be empty".to_string()));
        }

        if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must not contain whitespace or control characters: {url:?}"
            )));
        }

        let parsed = Url::parse(url).map_err(|e| ShortenerError::InvalidUrl(format!("{e}: {url}")))?;

        match parsed.scheme() {
            "http" | "https" if parsed.has_host() => Ok(()),
            "http" | "https" => Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {url}"
            ))),
            scheme => Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https, got '{scheme}'"
            ))),
        }
    }

    async fn short_code(&self, alias: Option<String>) -> Result<ShortCode> {
        match alias {
            Some(alias) => Ok(ShortCode::alias(alias)?),
            None => Ok(self.generator.generate().await?.into()),
        }
    }
}

// Stored timestamps have millisecond resolution.
fn now() -> Timestamp {
    let now = Timestamp::now();
    now.round(Unit::Millisecond).unwrap_or(now)
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<UrlRecord> {
        Self::validate_url(&params.long_url)?;

        let custom = params.custom_alias.is_some();
        let short_code = self.short_code(params.custom_alias).await?;
        let record = UrlRecord::new(short_code, params.long_url, now());

        if let Err(err) = self.repository.insert(&record).await {
            debug!(code = %record.short_code, error = %err, "insert rejected");
            return Err(err.into());
        }

        info!(code = %record.short_code, custom, "created short url");
        self.cache.populate(&record).await;

        Ok(record)
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self.repository.get(code).await?)
    }
}
