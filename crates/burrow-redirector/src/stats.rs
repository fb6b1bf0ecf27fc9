use burrow_core::{HitRecorder, ShortCode};
use jiff::Timestamp;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// A successful resolution waiting to be counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitEvent {
    pub code: ShortCode,
    pub at: Timestamp,
}

/// Fire-and-forget click counting.
///
/// Handles are cheap to clone and never block: [`record_hit`](Self::record_hit)
/// pushes onto an unbounded channel drained by a single background
/// [`StatsWorker`]. Failed writes are logged and dropped, never retried.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    tx: mpsc::UnboundedSender<HitEvent>,
}

/// The task draining a [`StatsAccumulator`].
///
/// The worker stops once every accumulator handle has been dropped and the
/// queue is empty.
#[derive(Debug)]
pub struct StatsWorker {
    handle: JoinHandle<u64>,
}

impl StatsAccumulator {
    /// Spawns the worker on the current tokio runtime.
    pub fn start(recorder: Arc<dyn HitRecorder>) -> (Self, StatsWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(recorder, rx));
        (Self { tx }, StatsWorker { handle })
    }

    /// Queues a hit on `code` timestamped now.
    pub fn record_hit(&self, code: ShortCode) {
        let event = HitEvent {
            code,
            at: Timestamp::now(),
        };
        if let Err(err) = self.tx.send(event) {
            warn!(code = %err.0.code, "stats worker is gone, dropping hit");
        }
    }
}

impl StatsWorker {
    /// Waits for the queue to drain and returns how many hits were applied.
    pub async fn join(self) -> u64 {
        match self.handle.await {
            Ok(applied) => applied,
            Err(err) => {
                warn!(error = %err, "stats worker did not finish cleanly");
                0
            }
        }
    }
}

async fn drain(recorder: Arc<dyn HitRecorder>, mut rx: mpsc::UnboundedReceiver<HitEvent>) -> u64 {
    let mut applied = 0;

    while let Some(HitEvent { code, at }) = rx.recv().await {
        match recorder.record_hit(&code, at).await {
            Ok(true) => {
                applied += 1;
                trace!(code = %code, "hit recorded");
            }
            Ok(false) => debug!(code = %code, "hit for unknown short code"),
            Err(err) => warn!(code = %code, error = %err, "failed to record hit"),
        }
    }

    info!(applied, "stats worker stopped");
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use burrow_core::repository::Result;
    use burrow_core::{ReadRepository, Repository, StorageError, UrlRecord};
    use burrow_storage::InMemoryRepository;

    struct FailingRecorder;

    #[async_trait]
    impl HitRecorder for FailingRecorder {
        async fn record_hit(&self, _code: &ShortCode, _at: Timestamp) -> Result<bool> {
            Err(StorageError::Unavailable("connection reset".to_string()))
        }
    }

    async fn repo_with(code: &str) -> Arc<InMemoryRepository> {
        let repo = Arc::new(InMemoryRepository::new());
        repo.insert(&UrlRecord::new(
            ShortCode::new_unchecked(code),
            "https://example.com",
            Timestamp::now(),
        ))
        .await
        .unwrap();
        repo
    }

    #[tokio::test]
    async fn hits_are_applied_before_join_returns() {
        let repo = repo_with("abc").await;
        let (stats, worker) = StatsAccumulator::start(repo.clone());

        for _ in 0..25 {
            stats.clone().record_hit(ShortCode::new_unchecked("abc"));
        }
        drop(stats);

        assert_eq!(worker.join().await, 25);
        let record = repo.get(&ShortCode::new_unchecked("abc")).await.unwrap().unwrap();
        assert_eq!(record.clicks, 25);
        assert!(record.last_accessed.is_some());
    }

    #[tokio::test]
    async fn unknown_codes_are_skipped() {
        let repo = repo_with("abc").await;
        let (stats, worker) = StatsAccumulator::start(repo.clone());

        stats.record_hit(ShortCode::new_unchecked("nope"));
        stats.record_hit(ShortCode::new_unchecked("abc"));
        drop(stats);

        assert_eq!(worker.join().await, 1);
    }

    #[tokio::test]
    async fn failures_do_not_stop_the_worker() {
        let (stats, worker) = StatsAccumulator::start(Arc::new(FailingRecorder));

        stats.record_hit(ShortCode::new_unchecked("abc"));
        stats.record_hit(ShortCode::new_unchecked("def"));
        drop(stats);

        assert_eq!(worker.join().await, 0);
    }

    #[tokio::test]
    async fn record_hit_after_worker_exit_does_not_panic() {
        let (stats, worker) = StatsAccumulator::start(Arc::new(FailingRecorder));
        worker.handle.abort();
        let _ = worker.handle.await;

        stats.record_hit(ShortCode::new_unchecked("abc"));
    }
}
