//! Tracing setup shared by the snaplink binaries.
//!
//! [`init`] installs a global subscriber made of:
//!
//! - an [`EnvFilter`] read from `RUST_LOG`, falling back to
//!   [`TelemetryConfig::default_filter`],
//! - a fmt layer writing either human-readable text or one JSON object per
//!   event,
//! - an OpenTelemetry layer exporting spans over OTLP/HTTP, only when an
//!   endpoint is configured.
//!
//! `log` records (sqlx emits these) are bridged into tracing.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install log bridge: {0}")]
    LogBridge(#[from] tracing_log::log::SetLoggerError),
    #[error("failed to install global subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
    #[error("failed to build OTLP exporter: {0}")]
    Exporter(#[from] opentelemetry_otlp::ExporterBuildError),
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Reported as `service.name` on exported spans.
    pub service_name: String,
    /// Filter directives used when `RUST_LOG` is unset.
    pub default_filter: String,
    pub format: LogFormat,
    /// Full OTLP/HTTP traces URL, e.g. `http://localhost:4318/v1/traces`.
    pub otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            default_filter: "info".to_string(),
            format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

/// Keeps the tracer provider alive. Dropping it flushes pending spans.
#[must_use = "dropping the guard shuts down span export"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {e}");
            }
        }
    }
}

/// Installs the global subscriber. Call once, early in `main`.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    LogTracer::init()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let (json, text) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json().with_current_span(true)), None),
        LogFormat::Text => (None, Some(fmt::layer())),
    };

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| build_provider(&config.service_name, endpoint))
        .transpose()?;

    let otel = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let subscriber = Registry::default()
        .with(env_filter)
        .with(json)
        .with(text)
        .with(otel);
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(endpoint) = &config.otlp_endpoint {
        tracing::info!(endpoint = %endpoint, "exporting spans over OTLP");
    }

    Ok(TelemetryGuard { provider })
}

fn build_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider, TelemetryError> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpJson)
        .with_endpoint(endpoint)
        .build()?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            Resource::builder()
                .with_attribute(KeyValue::new("service.name", service_name.to_owned()))
                .build(),
        )
        .build())
}
