//! Cache implementations shared across Burrow services.
//!
//! Every backend implements [`UrlCache`]. Services never call a backend
//! directly; they go through [`CacheStore`], which bounds each call with a
//! timeout and turns failures into misses.

pub mod moka;
pub mod null;
pub mod redis;
pub mod store;

pub use burrow_core::{CacheEntry, CacheError, UrlCache};
pub use null::NullUrlCache;
pub use redis::RedisUrlCache;
pub use store::{CacheStore, CacheStoreSettings};
pub use self::moka::{MokaUrlCache, MokaUrlCacheSettings};

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;
