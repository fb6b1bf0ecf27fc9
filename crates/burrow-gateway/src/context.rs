use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use burrow_cache::{CacheStore, MokaUrlCache, NullUrlCache, RedisUrlCache, UrlCache};
use burrow_core::{Repository, SequenceStore};
use burrow_generator::{SeqGenerator, SeqGeneratorSettings};
use burrow_redirector::{RedirectorService, StatsAccumulator, StatsWorker};
use burrow_shortener::ShortenerService;
use burrow_storage::{
    InMemoryRepository, InMemorySequenceStore, MySqlRepository, MySqlSequenceStore,
};
use tracing::{info, warn};

use crate::app::App;
use crate::cli::{CacheBackendArg, Cli, StorageBackendArg};
use crate::state::AppState;

/// Everything the gateway owns while it is serving.
pub struct AppContext {
    state: AppState,
    stats_worker: StatsWorker,
    mysql: Option<MySqlRepository>,
}

impl AppContext {
    /// Connects the configured backends and wires the services together.
    ///
    /// An unreachable store is fatal. An unreachable Redis only disables
    /// caching.
    pub async fn init(cli: &Cli) -> anyhow::Result<Self> {
        let cache = CacheStore::new(build_cache(cli).await, cli.cache_settings());
        let settings = cli.generator_settings();

        match cli.storage {
            StorageBackendArg::InMemory => {
                info!("using in-memory storage");
                Self::assemble(
                    Arc::new(InMemoryRepository::new()),
                    InMemorySequenceStore::new(),
                    cache,
                    settings,
                )
            }
            StorageBackendArg::Mysql => {
                let dsn = cli
                    .mysql_dsn
                    .as_deref()
                    .context("a MySQL DSN is required for mysql storage")?;
                let pool = burrow_storage::mysql::connect(dsn, cli.mysql_max_connections)
                    .await
                    .context("failed to connect to MySQL")?;
                burrow_storage::mysql::migrate(&pool)
                    .await
                    .context("failed to migrate MySQL schema")?;
                info!("using mysql storage");

                let repository = MySqlRepository::new(pool.clone());
                let mut context = Self::assemble(
                    Arc::new(repository.clone()),
                    MySqlSequenceStore::new(pool),
                    cache,
                    settings,
                )?;
                context.mysql = Some(repository);
                Ok(context)
            }
        }
    }

    /// Builds the services over an already connected store.
    ///
    /// Must be called from within a tokio runtime, since it spawns the stats
    /// worker.
    pub fn assemble<R, S>(
        repository: Arc<R>,
        sequences: S,
        cache: CacheStore,
        settings: SeqGeneratorSettings,
    ) -> anyhow::Result<Self>
    where
        R: Repository,
        S: SequenceStore,
    {
        let generator = SeqGenerator::new(sequences, settings)?;
        let (stats, stats_worker) = StatsAccumulator::start(repository.clone());

        let shortener = ShortenerService::new(repository.clone(), generator, cache.clone());
        let redirector = RedirectorService::new(repository, cache, stats);

        Ok(Self {
            state: AppState::new(Arc::new(shortener), Arc::new(redirector)),
            stats_worker,
            mysql: None,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        App::router(self.state.clone())
    }

    /// Drains pending hits and closes backend connections.
    ///
    /// Every router built from this context must have been dropped first,
    /// otherwise the stats worker keeps waiting for their hits.
    pub async fn shutdown(self) -> u64 {
        let Self {
            state,
            stats_worker,
            mysql,
        } = self;
        drop(state);

        let applied = stats_worker.join().await;
        info!(applied, "stats drained");

        if let Some(repository) = mysql {
            repository.pool().close().await;
            info!("mysql pool closed");
        }
        applied
    }
}

async fn build_cache(cli: &Cli) -> Arc<dyn UrlCache> {
    match cli.cache {
        CacheBackendArg::None => {
            info!("caching disabled");
            Arc::new(NullUrlCache)
        }
        CacheBackendArg::Moka => {
            info!(capacity = cli.moka_capacity, "using in-process cache");
            Arc::new(MokaUrlCache::with_capacity(cli.moka_capacity))
        }
        CacheBackendArg::Redis => {
            match RedisUrlCache::connect(&cli.redis_url, cli.cache_key_prefix.clone()).await {
                Ok(cache) => Arc::new(cache),
                Err(err) => {
                    warn!(error = %err, url = %cli.redis_url, "redis unavailable, caching disabled");
                    Arc::new(NullUrlCache)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[tokio::test]
    async fn in_memory_context_starts_and_stops() {
        let cli = Cli::try_parse_from(["burrow-gateway", "--cache", "none"]).unwrap();

        let context = AppContext::init(&cli).await.unwrap();
        drop(context.router());

        assert_eq!(context.shutdown().await, 0);
    }

    #[tokio::test]
    async fn unreachable_redis_degrades_to_no_cache() {
        let cli = Cli::try_parse_from([
            "burrow-gateway",
            "--cache",
            "redis",
            "--redis-url",
            "redis://127.0.0.1:1",
        ])
        .unwrap();

        let context = AppContext::init(&cli).await.unwrap();
        assert_eq!(context.shutdown().await, 0);
    }

    #[tokio::test]
    async fn invalid_machine_id_is_fatal() {
        let cli = Cli::try_parse_from(["burrow-gateway", "--machine-id", "99999999999999"]).unwrap();

        assert!(AppContext::init(&cli).await.is_err());
    }
}
