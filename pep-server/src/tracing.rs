//! Logging and OpenTelemetry tracing for the PEP server

use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    runtime,
    trace::{self, RandomIdGenerator, Sampler},
    Resource,
};
use std::time::Duration;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const DEFAULT_FILTER: &str = "info,pep=debug";

/// Initialize OpenTelemetry with OTLP exporter
pub fn init_telemetry(service_name: &str) -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    // Collector address; the standard OTLP/gRPC port when unset
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let resource = Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]);

    // Export calls give up after three seconds
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(3));

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            trace::config()
                // OTEL_TRACES_SAMPLER_ARG is a ratio in [0, 1]
                .with_sampler(sampler_from(std::env::var("OTEL_TRACES_SAMPLER_ARG").ok()))
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)?;

    Ok(tracer)
}

/// Sampler for a `OTEL_TRACES_SAMPLER_ARG` value; unset or unparsable samples everything
fn sampler_from(arg: Option<String>) -> Sampler {
    let sample_rate = arg.and_then(|s| s.parse::<f64>().ok()).unwrap_or(1.0);

    if sample_rate >= 1.0 {
        Sampler::AlwaysOn
    } else if sample_rate <= 0.0 {
        Sampler::AlwaysOff
    } else {
        Sampler::TraceIdRatioBased(sample_rate)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the complete tracing stack (console + OpenTelemetry)
pub fn init_tracing_stack(service_name: &str) -> anyhow::Result<()> {
    let tracer = init_telemetry(service_name)?;
    let otel_layer = OpenTelemetryLayer::new(tracer);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_thread_ids(true)
        .with_thread_names(true);

    Registry::default()
        .with(env_filter())
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()?;

    Ok(())
}

/// Initialize console-only logging
pub fn init_console() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {}", e))
}

/// Shutdown OpenTelemetry provider
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Span covering one authorization decision
pub fn create_authorization_span(principal: &str, action: &str, resource: &str) -> tracing::Span {
    tracing::info_span!(
        "authorize_request",
        principal = %principal,
        action = %action,
        resource = %resource,
        decision = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
        error = tracing::field::Empty,
        otel.kind = "server",
        otel.status_code = tracing::field::Empty,
    )
}

/// Record decision in current span
pub fn record_decision(decision: &str, latency_ms: f64) {
    let span = tracing::Span::current();
    span.record("decision", decision);
    span.record("latency_ms", latency_ms);
    span.record("otel.status_code", "OK");
}

/// Record error in current span
pub fn record_error(error: &str) {
    let span = tracing::Span::current();
    span.record("otel.status_code", "ERROR");
    span.record("error", error);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::subscriber::with_default;

    #[test]
    fn test_sampler_defaults_to_always_on() {
        assert!(matches!(sampler_from(None), Sampler::AlwaysOn));
        assert!(matches!(sampler_from(Some("invalid".into())), Sampler::AlwaysOn));
        assert!(matches!(sampler_from(Some("2.0".into())), Sampler::AlwaysOn));
    }

    #[test]
    fn test_sampler_bounds() {
        assert!(matches!(sampler_from(Some("0.0".into())), Sampler::AlwaysOff));
        assert!(matches!(sampler_from(Some("-0.5".into())), Sampler::AlwaysOff));
        assert!(matches!(
            sampler_from(Some("0.5".into())),
            Sampler::TraceIdRatioBased(_)
        ));
    }

    #[test]
    fn test_create_authorization_span() {
        with_default(Registry::default(), || {
            let span = create_authorization_span(
                r#"User::"alice""#,
                r#"Action::"get""#,
                r#"ResourceType::"article""#,
            );
            assert_eq!(span.metadata().unwrap().name(), "authorize_request");

            let _guard = span.enter();
            record_decision("allow", 1.5);
            record_error("PDP response is missing the decision field");
        });
    }

    #[test]
    fn test_shutdown_telemetry() {
        shutdown_telemetry();
    }
}
