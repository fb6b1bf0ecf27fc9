//! Record store and sequence store backends.
//!
//! [`memory`] keeps everything in process and is meant for tests and single
//! instance deployments. [`mysql`] is the durable backend shared between
//! instances.

pub mod memory;
pub mod mysql;

pub use burrow_core::repository::{HitRecorder, ReadRepository, Repository, Result, UrlRecord};
pub use burrow_core::{SequenceStore, StorageError};
pub use memory::{InMemoryRepository, InMemorySequenceStore};
pub use mysql::{MySqlRepository, MySqlSequenceStore};
