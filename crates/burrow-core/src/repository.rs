use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL record in the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// The unique key of the record.
    pub short_code: ShortCode,
    /// The original URL that was shortened.
    pub long_url: String,
    /// When the record was created.
    pub created_at: Timestamp,
    /// How many times the short code has been resolved.
    pub clicks: u64,
    /// When the short code was last resolved, if ever.
    pub last_accessed: Option<Timestamp>,
}

impl UrlRecord {
    /// Creates a fresh record with no recorded hits.
    pub fn new(short_code: ShortCode, long_url: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            short_code,
            long_url: long_url.into(),
            created_at,
            clicks: 0,
            last_accessed: None,
        }
    }
}

/// A read-only view of a repository.
///
/// This trait provides only the read operations from [`Repository`].
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}

/// Click bookkeeping for resolved short codes.
#[async_trait]
pub trait HitRecorder: Send + Sync + 'static {
    /// Increments the click counter and sets `last_accessed` to `at`.
    ///
    /// The increment must be applied atomically by the backend, never as a
    /// read-modify-write. Returns `false` if no record matches `code`.
    async fn record_hit(&self, code: &ShortCode, at: Timestamp) -> Result<bool>;
}

#[async_trait]
pub trait Repository: ReadRepository + HitRecorder {
    /// Inserts a new URL record.
    ///
    /// Returns `Err(StorageError::Conflict)` if the code already exists; an
    /// existing record is never overwritten.
    async fn insert(&self, record: &UrlRecord) -> Result<()>;
}
