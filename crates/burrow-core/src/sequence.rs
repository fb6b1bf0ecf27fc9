use crate::error::StorageError;
use async_trait::async_trait;

/// Durable named counters.
#[async_trait]
pub trait SequenceStore: Send + Sync + 'static {
    /// Atomically increments the counter called `name` and returns the new value.
    ///
    /// A counter that does not exist yet is created by the same operation, so
    /// the first call for a name returns `1`. Concurrent callers, in this
    /// process or any other sharing the backend, always observe distinct values.
    async fn increment(&self, name: &str) -> Result<u64, StorageError>;
}
