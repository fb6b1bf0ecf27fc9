//! Disposable containers for integration tests.

pub mod mysql;
pub mod redis;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FixtureError>;

/// Why a fixture could not be started or reached.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("container did not start: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("cannot open a redis client for {url}: {source}")]
    RedisClient {
        url: String,
        #[source]
        source: ::redis::RedisError,
    },
}
