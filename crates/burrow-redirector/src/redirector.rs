use crate::Result;
use async_trait::async_trait;
use burrow_core::ShortCode;

/// Where a resolution was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    CacheHit,
    CacheMiss,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub long_url: String,
    pub resolution: Resolution,
}

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the long URL it redirects to.
    ///
    /// Fails with [`RedirectorError::NotFound`](crate::RedirectorError::NotFound)
    /// if no record exists for `code`.
    async fn resolve(&self, code: &ShortCode) -> Result<Resolved>;
}
