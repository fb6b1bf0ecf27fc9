use burrow_cache::CacheStoreSettings;
use burrow_generator::SeqGeneratorSettings;
use burrow_telemetry::{LogFormat, TelemetryConfig};
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "BURROW_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "BURROW_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BURROW_MYSQL_DSN";
pub const MYSQL_MAX_CONNECTIONS_ENV: &str = "BURROW_MYSQL_MAX_CONNECTIONS";
pub const CACHE_BACKEND_ENV: &str = "BURROW_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "BURROW_REDIS_URL";
pub const MACHINE_ID_ENV: &str = "BURROW_MACHINE_ID";
pub const COUNTER_NAME_ENV: &str = "BURROW_COUNTER_NAME";
pub const CACHE_TTL_SECONDS_ENV: &str = "BURROW_CACHE_TTL_SECONDS";
pub const CACHE_KEY_PREFIX_ENV: &str = "BURROW_CACHE_KEY_PREFIX";
pub const CACHE_TIMEOUT_MS_ENV: &str = "BURROW_CACHE_TIMEOUT_MS";
pub const MOKA_CAPACITY_ENV: &str = "BURROW_MOKA_CAPACITY";
pub const LOG_FORMAT_ENV: &str = "BURROW_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "BURROW_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_COUNTER_NAME: &str = "url_id";
pub const DEFAULT_CACHE_KEY_PREFIX: &str = "url:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    #[value(name = "none")]
    None,
    #[value(name = "moka")]
    Moka,
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::None => write!(f, "none"),
            CacheBackendArg::Moka => write!(f, "moka"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "burrow-gateway", version, about = "Burrow URL shortener HTTP gateway")]
pub struct Cli {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    #[arg(long, env = MYSQL_MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub mysql_max_connections: u32,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::Moka
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    /// Packed into the high bits of every generated id; unique per instance.
    #[arg(long, env = MACHINE_ID_ENV, default_value_t = 1)]
    pub machine_id: u64,

    #[arg(long, env = COUNTER_NAME_ENV, default_value = DEFAULT_COUNTER_NAME)]
    pub counter_name: String,

    #[arg(long, env = CACHE_TTL_SECONDS_ENV, default_value_t = 3600)]
    pub cache_ttl_seconds: u64,

    #[arg(long, env = CACHE_KEY_PREFIX_ENV, default_value = DEFAULT_CACHE_KEY_PREFIX)]
    pub cache_key_prefix: String,

    #[arg(long, env = CACHE_TIMEOUT_MS_ENV, default_value_t = 250)]
    pub cache_timeout_ms: u64,

    #[arg(long, env = MOKA_CAPACITY_ENV, default_value_t = 10_000)]
    pub moka_capacity: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    /// Export spans to this OTLP gRPC endpoint, e.g. http://localhost:4317.
    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl Cli {
    pub fn generator_settings(&self) -> SeqGeneratorSettings {
        SeqGeneratorSettings::builder()
            .machine_id(self.machine_id)
            .counter_name(self.counter_name.clone())
            .build()
    }

    pub fn cache_settings(&self) -> CacheStoreSettings {
        CacheStoreSettings::builder()
            .ttl(Duration::from_secs(self.cache_ttl_seconds))
            .timeout(Duration::from_millis(self.cache_timeout_ms))
            .build()
    }

    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig::builder()
            .service_name("burrow-gateway")
            .log_format(self.log_format.into())
            .otlp_endpoint(self.otlp_endpoint.clone())
            .build()
    }
}
