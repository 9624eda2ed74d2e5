use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::ExporterBuildError;
use opentelemetry_otlp::{WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, SdkTracerProvider};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::Registry;
use tracing_subscriber::layer::{Layer, SubscriberExt};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to build OTLP exporter")]
    OtlpExporter(#[from] ExporterBuildError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Failed to spawn HTTP client thread")]
    ThreadSpawn,

    #[error("Failed to set global subscriber")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Flushes pending spans when the CLI exits.
pub struct TelemetryGuard {
    tracer_provider: SdkTracerProvider,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let _ = self.tracer_provider.force_flush();
    }
}

const TRACER_NAME: &str = "pedidos-tracer";

#[derive(Debug, Clone)]
pub struct OtlpConfig {
    pub endpoint: String,
    pub api_key: String,
    pub service_name: String,
}

/// Default `EnvFilter` directive for both workspace crates.
pub fn default_filter(log_level: tracing::Level) -> String {
    format!("pedidos={log_level},pedidos_client={log_level}")
}

pub fn setup_telemetry(
    config: OtlpConfig,
    log_level: tracing::Level,
) -> Result<TelemetryGuard, TelemetryError> {
    let headers = HashMap::from([("authorization".to_string(), config.api_key)]);

    // The blocking client spins up its own runtime and must not be built on a
    // tokio worker thread.
    let http_client = std::thread::spawn(|| {
        reqwest::blocking::Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| format!("{e}"))
    })
    .join()
    .map_err(|_| TelemetryError::ThreadSpawn)?
    .map_err(TelemetryError::HttpClient)?;

    let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_http_client(http_client)
        .with_endpoint(config.endpoint)
        .with_headers(headers)
        .with_protocol(opentelemetry_otlp::Protocol::HttpBinary)
        .build()?;

    let batch_exporter = BatchSpanProcessor::builder(otlp_exporter)
        .with_batch_config(
            BatchConfigBuilder::default()
                .with_max_export_batch_size(256)
                .with_max_queue_size(1024)
                .with_scheduled_delay(Duration::from_secs(2))
                .build(),
        )
        .build();

    let tracer_provider = SdkTracerProvider::builder()
        .with_span_processor(batch_exporter)
        .with_resource(
            Resource::builder()
                .with_service_name(config.service_name)
                .with_attributes(vec![KeyValue::new("client.kind", "cli")])
                .build(),
        )
        .build();

    let tracer = tracer_provider.tracer(TRACER_NAME);

    let telemetry_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let default_filter = default_filter(log_level);

    let fmt_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.clone().into());

    let telemetry_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(fmt_filter);
    let telemetry_layer = telemetry_layer.with_filter(telemetry_filter);

    let subscriber = Registry::default().with(fmt_layer).with(telemetry_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(TelemetryGuard { tracer_provider })
}
