use clap::Parser;
use pedidos_client::{DynOrderClient, HttpOrderClient, InMemoryOrderClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use crate::telemetry::{OtlpConfig, TelemetryGuard, default_filter, setup_telemetry};

#[derive(clap::ValueEnum, Debug, Clone)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        (&log_level).into()
    }
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Env {
    /// Base URL of the pedidos API; endpoints live under `<base>/pedidos`
    #[clap(long, env, default_value = "http://localhost:8000/api")]
    pub api_base_url: url::Url,
    #[clap(long, env, default_value = "warn")]
    pub log_level: LogLevel,
    /// Request timeout in seconds
    #[clap(long, env, default_value = "10")]
    pub request_timeout_secs: u64,
    /// Use a process-local backend instead of the API
    #[clap(long, env, default_value = "false")]
    pub dry_run: bool,
    /// API key for OTLP span export (optional)
    #[clap(long, env)]
    pub otlp_api_key: Option<String>,
    #[clap(long, env, default_value = "https://in-otel.hyperdx.io/v1/traces")]
    pub otlp_endpoint: String,
    #[clap(long, env, default_value = "pedidos-cli")]
    pub otlp_service_name: String,
}

impl Env {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn get_client(&self) -> Result<DynOrderClient, pedidos_client::ClientError> {
        if self.dry_run {
            Ok(Arc::new(InMemoryOrderClient::new()))
        } else {
            Ok(Arc::new(HttpOrderClient::new(
                self.api_base_url.as_str(),
                self.request_timeout(),
            )?))
        }
    }

    fn otlp_config(&self) -> Option<OtlpConfig> {
        self.otlp_api_key.as_ref().map(|api_key| OtlpConfig {
            endpoint: self.otlp_endpoint.clone(),
            api_key: api_key.clone(),
            service_name: self.otlp_service_name.clone(),
        })
    }
}

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
pub fn setup_tracing(env: &Env) -> Option<TelemetryGuard> {
    let level: Level = (&env.log_level).into();

    if let Some(config) = env.otlp_config() {
        match setup_telemetry(config, level) {
            Ok(guard) => return Some(guard),
            Err(e) => {
                eprintln!("Failed to set up OTLP export: {e}, falling back to console logging");
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(level).into()),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    None
}
