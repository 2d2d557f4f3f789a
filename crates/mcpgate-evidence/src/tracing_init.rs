// mcpgate-evidence/src/tracing_init.rs
// ============================================================================
// Module: Tracing Initialization
// Description: One span per command, with an optional OTLP exporter.
// Purpose: spec.md §4.9: "one span per command; the OTLP exporter is
//          constructed only when enabled; shutdown errors are warnings, not
//          fatal."
// Dependencies: tracing, tracing-subscriber; opentelemetry* behind "otlp"
// ============================================================================

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::EvidenceError;

/// Tracing setup, mirroring the `proxy`/CLI flags that control it.
pub struct TracingConfig {
    /// `tracing_subscriber::EnvFilter` directive string, e.g. `"mcpgate=info"`.
    pub filter: String,
    /// OTLP collector endpoint; when set, a span exporter is constructed.
    pub otlp_endpoint: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            filter: "mcpgate=info".to_string(),
            otlp_endpoint: None,
        }
    }
}

/// Holds the resources `init` constructed so they can be shut down cleanly.
pub struct TracingGuard {
    /// Tracer provider, present only when an OTLP endpoint was configured.
    #[cfg(feature = "otlp")]
    provider: Option<opentelemetry_sdk::trace::SdkTracerProvider>,
}

impl TracingGuard {
    /// Flushes and shuts down the OTLP exporter, if one was constructed.
    /// Failures here are logged as warnings, never propagated: spec.md §4.9
    /// treats exporter shutdown as best-effort.
    pub fn shutdown(self) {
        #[cfg(feature = "otlp")]
        if let Some(provider) = self.provider {
            if let Err(err) = provider.shutdown() {
                tracing::warn!(error = %err, "OTLP tracer provider shutdown failed");
            }
        }
    }
}

/// Installs the global tracing subscriber: an `EnvFilter` + `fmt` layer
/// always, plus an OTLP layer when `config.otlp_endpoint` is set and this
/// crate was built with the `otlp` feature.
///
/// # Errors
///
/// Returns [`EvidenceError::TracingInit`] when the OTLP pipeline cannot be
/// constructed. Never fails solely because no OTLP endpoint was configured.
pub fn init(config: &TracingConfig) -> Result<TracingGuard, EvidenceError> {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer();

    #[cfg(feature = "otlp")]
    {
        if let Some(endpoint) = &config.otlp_endpoint {
            let (otel_layer, provider) = build_otlp_layer(endpoint)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .with(otel_layer)
                .try_init()
                .map_err(|err| EvidenceError::TracingInit(err.to_string()))?;
            return Ok(TracingGuard {
                provider: Some(provider),
            });
        }
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| EvidenceError::TracingInit(err.to_string()))?;

    Ok(TracingGuard {
        #[cfg(feature = "otlp")]
        provider: None,
    })
}

#[cfg(feature = "otlp")]
/// Builds the OTLP span exporter and tracer provider for `endpoint`, and the
/// `tracing-opentelemetry` layer bridging span events to it.
fn build_otlp_layer(
    endpoint: &str,
) -> Result<
    (
        tracing_opentelemetry::OpenTelemetryLayer<tracing_subscriber::Registry, opentelemetry_sdk::trace::Tracer>,
        opentelemetry_sdk::trace::SdkTracerProvider,
    ),
    EvidenceError,
> {
    use opentelemetry::trace::TracerProvider as _;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|err| EvidenceError::TracingInit(err.to_string()))?;

    let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();
    let tracer = provider.tracer("mcpgate");
    let layer = tracing_opentelemetry::layer().with_tracer(tracer);
    Ok((layer, provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_otlp_endpoint() {
        let config = TracingConfig::default();
        assert!(config.otlp_endpoint.is_none());
        assert_eq!(config.filter, "mcpgate=info");
    }
}
