//! URL shortener service implementation.
//!
//! This crate owns the write path: validating the requested alias or
//! drawing a generated code, inserting the record, and warming the cache.

pub mod error;
pub mod service;
pub mod shortener;

pub use error::{Result, ShortenerError};
pub use service::ShortenerService;
pub use shortener::{ShortenParams, Shortener};
