use async_trait::async_trait;
use burrow_core::error::StorageError;
use burrow_core::repository::{HitRecorder, ReadRepository, Repository, Result, UrlRecord};
use burrow_core::sequence::SequenceStore;
use burrow_core::shortcode::ShortCode;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;

/// In-memory implementation of the repository contract using DashMap.
///
/// DashMap uses sharded locks, so operations on different codes do not block
/// each other while operations on the same code are serialized by its shard.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, UrlRecord>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|record| record.value().clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.storage.contains_key(code.as_str()))
    }
}

#[async_trait]
impl HitRecorder for InMemoryRepository {
    async fn record_hit(&self, code: &ShortCode, at: Timestamp) -> Result<bool> {
        let Some(mut record) = self.storage.get_mut(code.as_str()) else {
            return Ok(false);
        };

        record.clicks += 1;
        record.last_accessed = Some(at);
        Ok(true)
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, record: &UrlRecord) -> Result<()> {
        // The entry API holds the shard lock, making check-and-insert atomic.
        match self.storage.entry(record.short_code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(record.short_code.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }
}

/// In-memory named counters.
#[derive(Debug, Default)]
pub struct InMemorySequenceStore {
    counters: DashMap<String, u64>,
}

impl InMemorySequenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the counter `name` to `value`, so the next increment returns `value + 1`.
    pub fn seed(&self, name: &str, value: u64) {
        self.counters.insert(name.to_owned(), value);
    }

    /// Returns the current value of `name` without incrementing it.
    pub fn current(&self, name: &str) -> Option<u64> {
        self.counters.get(name).map(|value| *value)
    }
}

#[async_trait]
impl SequenceStore for InMemorySequenceStore {
    async fn increment(&self, name: &str) -> std::result::Result<u64, StorageError> {
        let mut value = self.counters.entry(name.to_owned()).or_insert(0);
        *value = value
            .checked_add(1)
            .ok_or_else(|| StorageError::Operation(format!("counter '{name}' overflowed")))?;
        Ok(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn record(c: &str, url: &str) -> UrlRecord {
        UrlRecord::new(code(c), url, Timestamp::from_second(1_700_000_000).unwrap())
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryRepository::new();

        repo.insert(&record("abc123", "https://example.com"))
            .await
            .unwrap();

        let result = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(result.long_url, "https://example.com");
        assert_eq!(result.clicks, 0);
        assert_eq!(result.last_accessed, None);
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(repo.get(&code("nope")).await.unwrap().is_none());
        assert!(!repo.exists(&code("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn insert_never_overwrites() {
        let repo = InMemoryRepository::new();

        repo.insert(&record("abc123", "https://example.com"))
            .await
            .unwrap();

        let err = repo
            .insert(&record("abc123", "https://other.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        let kept = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(kept.long_url, "https://example.com");
    }

    #[tokio::test]
    async fn codes_are_case_sensitive() {
        let repo = InMemoryRepository::new();

        repo.insert(&record("Promo", "https://a.example"))
            .await
            .unwrap();
        repo.insert(&record("promo", "https://b.example"))
            .await
            .unwrap();

        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn record_hit_updates_stats() {
        let repo = InMemoryRepository::new();
        repo.insert(&record("abc", "https://example.com"))
            .await
            .unwrap();
        let at = Timestamp::from_second(1_800_000_000).unwrap();

        assert!(repo.record_hit(&code("abc"), at).await.unwrap());
        assert!(repo.record_hit(&code("abc"), at).await.unwrap());

        let result = repo.get(&code("abc")).await.unwrap().unwrap();
        assert_eq!(result.clicks, 2);
        assert_eq!(result.last_accessed, Some(at));
    }

    #[tokio::test]
    async fn record_hit_on_missing_code() {
        let repo = InMemoryRepository::new();

        assert!(!repo.record_hit(&code("gone"), Timestamp::now()).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_inserts_of_one_code_have_one_winner() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut handles = vec![];

        for i in 0..16 {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                repo.insert(&record("promo", &format!("https://example{i}.com")))
                    .await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => ok += 1,
                Err(StorageError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
    }

    #[tokio::test]
    async fn concurrent_hits_are_not_lost() {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert(&record("hot", "https://example.com"))
            .await
            .unwrap();

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.record_hit(&code("hot"), Timestamp::now()).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        assert_eq!(repo.get(&code("hot")).await.unwrap().unwrap().clicks, 100);
    }

    #[tokio::test]
    async fn sequence_starts_at_one() {
        let store = InMemorySequenceStore::new();

        assert_eq!(store.increment("url_id").await.unwrap(), 1);
        assert_eq!(store.increment("url_id").await.unwrap(), 2);
        assert_eq!(store.increment("other").await.unwrap(), 1);
        assert_eq!(store.current("url_id"), Some(2));
    }

    #[tokio::test]
    async fn seeded_sequence_continues() {
        let store = InMemorySequenceStore::new();
        store.seed("url_id", 41);

        assert_eq!(store.increment("url_id").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn sequence_overflow_is_an_error() {
        let store = InMemorySequenceStore::new();
        store.seed("url_id", u64::MAX);

        assert!(store.increment("url_id").await.is_err());
        assert_eq!(store.current("url_id"), Some(u64::MAX));
    }

    #[tokio::test]
    async fn concurrent_increments_are_distinct() {
        let store = Arc::new(InMemorySequenceStore::new());

        let handles: Vec<_> = (0..100)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.increment("url_id").await.unwrap() })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            seen.insert(handle.await.unwrap());
        }
        assert_eq!(seen, (1..=100).collect());
    }
}
