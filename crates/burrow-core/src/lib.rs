//! Core types and traits for the Burrow URL shortener.
//!
//! This crate provides the shared vocabulary used by the shortener and
//! redirector services: short codes and their base62 encoding, the stored
//! record, and the storage, sequence and cache contracts.

pub mod base62;
pub mod cache;
pub mod error;
pub mod repository;
pub mod sequence;
pub mod shortcode;

pub use base62::ShortCodeBase62;
pub use cache::{CacheEntry, UrlCache};
pub use error::{CacheError, CoreError, StorageError};
pub use repository::{HitRecorder, ReadRepository, Repository, UrlRecord};
pub use sequence::SequenceStore;
pub use shortcode::ShortCode;
