//! Tracing subscriber setup with optional OpenTelemetry export.
//!
//! Render and send spans (`renderer.render`, `mailer.send`) are exported
//! over OTLP when enabled.
//!
//! # Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LETTERPRESS__OTEL__ENABLED` | Enable OpenTelemetry tracing | `false` |
//! | `LETTERPRESS__OTEL__ENDPOINT` | OTLP gRPC endpoint | `http://localhost:4317` |
//! | `LETTERPRESS__OTEL__SERVICE_NAME` | Service name in traces | `letterpress` |
//! | `LETTERPRESS__OTEL__SAMPLING_RATIO` | Trace sampling ratio (0.0-1.0) | `1.0` |
//! | `RUST_LOG` | Log filter | `info` |

use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::OtelConfig;

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Telemetry-specific error type
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Failed to build OTLP exporter: {0}")]
    ExporterBuild(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to flush OpenTelemetry spans: {0}")]
    Shutdown(String),
}

/// Keeps the tracer provider alive for the process.
///
/// The batch exporter buffers spans in memory. A short-lived command exits
/// before the export interval elapses, so the provider is flushed and shut
/// down when the guard is released, either through [`TelemetryGuard::shutdown`]
/// or on drop.
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported over OTLP
    pub fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }

    /// Flush buffered spans and stop the exporter
    pub fn shutdown(mut self) -> TelemetryResult<()> {
        self.shutdown_provider()
    }

    fn shutdown_provider(&mut self) -> TelemetryResult<()> {
        let Some(provider) = self.provider.take() else {
            return Ok(());
        };
        tracing::debug!("Flushing OpenTelemetry spans");
        provider
            .shutdown()
            .map_err(|e| TelemetryError::Shutdown(e.to_string()))
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown_provider() {
            tracing::warn!(error = %e, "OpenTelemetry shutdown failed");
        }
    }
}

/// Install the global subscriber for `config`.
///
/// Logs go to stderr so command output on stdout stays clean. When OTLP
/// export is enabled a tracing-opentelemetry layer is stacked on top.
pub fn init_telemetry(config: &OtelConfig) -> TelemetryResult<TelemetryGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let provider = if config.enabled {
        Some(build_provider(config)?)
    } else {
        None
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(otel_layer)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInit(e.to_string()))?;

    if provider.is_some() {
        tracing::info!(
            endpoint = %config.endpoint,
            service_name = %config.service_name,
            sampling_ratio = %config.sampling_ratio,
            "OpenTelemetry export enabled"
        );
    } else {
        tracing::debug!("OpenTelemetry export disabled");
    }

    Ok(TelemetryGuard { provider })
}

fn build_provider(config: &OtelConfig) -> TelemetryResult<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.endpoint)
        .build()
        .map_err(|e| TelemetryError::ExporterBuild(e.to_string()))?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_sampler(sampler_for(config))
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource(config))
        .build())
}

fn resource(config: &OtelConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new(SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
    ])
}

fn sampler_for(config: &OtelConfig) -> Sampler {
    match config.sampling_ratio {
        ratio if ratio >= 1.0 => Sampler::AlwaysOn,
        ratio if ratio <= 0.0 => Sampler::AlwaysOff,
        ratio => Sampler::TraceIdRatioBased(ratio),
    }
}
