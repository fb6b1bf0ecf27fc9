//! Process-wide tracing setup.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`], a text or
//! JSON `fmt` layer and, when an OTLP endpoint is configured, an
//! OpenTelemetry span exporter. `log` records (e.g. from sqlx) are bridged
//! into tracing.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};
use typed_builder::TypedBuilder;

pub type Result<T> = std::result::Result<T, TelemetryError>;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(String),
    #[error("failed to install subscriber: {0}")]
    Subscriber(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Display for LogFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(setter(into))]
    pub service_name: String,
    #[builder(default)]
    pub log_format: LogFormat,
    /// Directive used when `RUST_LOG` is unset.
    #[builder(default = "info".to_string(), setter(into))]
    pub default_filter: String,
    /// gRPC endpoint of an OTLP collector, e.g. `http://localhost:4317`.
    #[builder(default)]
    pub otlp_endpoint: Option<String>,
}

/// Keeps the span exporter alive; flush it with [`TelemetryGuard::shutdown`].
#[derive(Debug)]
#[must_use = "dropping the guard without shutdown may lose buffered spans"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    pub fn exports_spans(&self) -> bool {
        self.provider.is_some()
    }

    /// Flushes buffered spans and stops the exporter.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(err) = provider.shutdown() {
                warn!(error = %err, "failed to flush spans on shutdown");
            }
        }
    }
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .build())
}

/// Installs the global subscriber. Call once, from inside the tokio runtime.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(&config.service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });
    let (text_layer, json_layer) = match config.log_format {
        LogFormat::Text => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json())),
    };

    let subscriber = Registry::default()
        .with(env_filter(&config.default_filter))
        .with(text_layer)
        .with(json_layer)
        .with(otel_layer);

    tracing_log::LogTracer::init().map_err(|e| TelemetryError::Subscriber(e.to_string()))?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))?;

    info!(
        service = %config.service_name,
        format = %config.log_format,
        otlp = config.otlp_endpoint.as_deref().unwrap_or("disabled"),
        "telemetry initialized"
    );

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_parses_case_insensitively() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn config_defaults() {
        let config = TelemetryConfig::builder().service_name("burrow").build();
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.default_filter, "info");
        assert!(config.otlp_endpoint.is_none());
    }

    #[tokio::test]
    async fn init_installs_once() {
        let config = TelemetryConfig::builder()
            .service_name("burrow-test")
            .log_format(LogFormat::Json)
            .build();

        let guard = init(&config).unwrap();
        assert!(!guard.exports_spans());
        guard.shutdown();

        assert!(matches!(init(&config), Err(TelemetryError::Subscriber(_))));
    }
}
