use crate::error::Result;
use async_trait::async_trait;
use burrow_core::{ShortCode, UrlRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenParams {
    /// The URL to be shortened; must be an absolute http(s) URL.
    pub long_url: String,
    /// Optional caller-chosen short code.
    pub custom_alias: Option<String>,
}

impl ShortenParams {
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            custom_alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.custom_alias = Some(alias.into());
        self
    }
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a new short code for `params.long_url` and returns the stored record.
    async fn shorten(&self, params: ShortenParams) -> Result<UrlRecord>;

    /// Reads the stored record, including click statistics, for `code`.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;
}
