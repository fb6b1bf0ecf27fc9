//! Redirector service library.
//!
//! [`RedirectorService`] resolves short codes with a cache-aside protocol:
//! probe the cache, fall back to the record store on a miss, repopulate the
//! cache, then hand the hit to the [`StatsAccumulator`] without waiting for
//! it to be written.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use burrow_cache::{CacheStore, CacheStoreSettings, MokaUrlCache};
//! use burrow_core::{HitRecorder, ShortCode};
//! use burrow_redirector::{Redirector, RedirectorService, StatsAccumulator};
//! use burrow_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = Arc::new(InMemoryRepository::new());
//! let cache = CacheStore::new(Arc::new(MokaUrlCache::new()), CacheStoreSettings::default());
//! let (stats, worker) = StatsAccumulator::start(repository.clone() as Arc<dyn HitRecorder>);
//!
//! let service = RedirectorService::new(repository, cache, stats);
//! match service.resolve(&ShortCode::new("abc123")?).await {
//!     Ok(resolved) => println!("Redirect to: {}", resolved.long_url),
//!     Err(err) => println!("{err}"),
//! }
//!
//! drop(service);
//! worker.join().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod redirector;
pub mod service;
pub mod stats;

pub use error::{RedirectorError, Result};
pub use redirector::{Redirector, Resolution, Resolved};
pub use service::RedirectorService;
pub use stats::{HitEvent, StatsAccumulator, StatsWorker};
