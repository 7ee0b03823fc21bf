//! Initializes stdout logging and, optionally, OpenTelemetry span export.
use std::env;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use thiserror::Error;
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Environment variable holding the OTLP collector endpoint.
pub const OTLP_URL_ENVVAR: &str = "BRIDGE_RELAYER_OTLP_URL";

/// Environment variable holding a service label appended to the whoami string.
pub const SVC_LABEL_ENVVAR: &str = "BRIDGE_RELAYER_SVC_LABEL";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The OTLP exporter could not be built.
    #[error("failed to build otlp exporter: {0}")]
    Exporter(String),

    /// A global subscriber was already installed.
    #[error("failed to install subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Identifies the service in logs and exported spans.
    whoami: String,

    /// Collector endpoint for span export, if any.
    otel_url: Option<String>,
}

impl LoggerConfig {
    /// Creates a config with the given whoami and no span export.
    pub const fn new(whoami: String) -> Self {
        Self {
            whoami,
            otel_url: None,
        }
    }

    /// Creates a config whose whoami is derived from `base` and the service label envvar.
    pub fn with_base_name(base: &str) -> Self {
        Self::new(get_whoami_string(base))
    }

    /// Enables span export to the given OTLP endpoint.
    pub fn set_otlp_url(&mut self, url: String) {
        self.otel_url = Some(url);
    }

    /// Returns the whoami string.
    pub fn whoami(&self) -> &str {
        &self.whoami
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::with_base_name("(bridge-relayer)")
    }
}

/// Installs the global tracing subscriber described by `config`.
///
/// Stdout output is filtered with `RUST_LOG`. `LOG_FILE=1` and `LOG_LINE_NUM=1` add source
/// locations to every event.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    let log_file = env::var("LOG_FILE").is_ok_and(|v| v == "1");
    let log_line_num = env::var("LOG_LINE_NUM").is_ok_and(|v| v == "1");

    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(log_file)
                .with_line_number(log_line_num),
        )
        .with_filter(filt);

    match &config.otel_url {
        Some(otel_url) => {
            let resource = Resource::builder()
                .with_attribute(KeyValue::new("service.name", config.whoami.clone()))
                .build();

            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(otel_url)
                .build()
                .map_err(|e| LoggingError::Exporter(e.to_string()))?;

            let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                .with_resource(resource)
                .with_batch_exporter(exporter)
                .build();

            let tracer = provider.tracer("bridge-relayer");
            let otel_sub = tracing_opentelemetry::layer().with_tracer(tracer);

            tracing_subscriber::registry()
                .with(stdout_sub)
                .with(otel_sub)
                .try_init()?;
        }
        None => tracing_subscriber::registry().with(stdout_sub).try_init()?,
    }

    info!(whoami = %config.whoami, otlp = config.otel_url.is_some(), "logging started");
    Ok(())
}

/// Reads the OTLP endpoint from [`OTLP_URL_ENVVAR`].
pub fn get_otlp_url_from_env() -> Option<String> {
    env::var(OTLP_URL_ENVVAR).ok()
}

/// Reads the service label from [`SVC_LABEL_ENVVAR`].
pub fn get_service_label_from_env() -> Option<String> {
    env::var(SVC_LABEL_ENVVAR).ok()
}

/// Builds the whoami string `base%label`, or just `base` when no label is set.
pub fn get_whoami_string(base: &str) -> String {
    match get_service_label_from_env() {
        Some(label) => format!("{base}%{label}"),
        None => base.to_owned(),
    }
}
