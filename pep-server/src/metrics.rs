//! Prometheus metrics collection for the PEP server

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Initialize all metric descriptions
pub fn init_metrics() {
    describe_counter!(
        "pep_authorization_requests_total",
        "Total number of gated requests, labelled by decision"
    );
    describe_counter!("pep_pdp_errors_total", "Total number of failed PDP calls");
    describe_histogram!(
        "pep_pdp_latency_seconds",
        "Round-trip latency of PDP calls in seconds"
    );
}

/// Record the outcome of one gated request
pub fn record_authorization(decision: &str) {
    counter!("pep_authorization_requests_total", 1, "decision" => decision.to_string());
}

/// Record the latency of one PDP call
pub fn record_pdp_latency(latency_seconds: f64) {
    histogram!("pep_pdp_latency_seconds", latency_seconds);
}

/// Record a failed PDP call
pub fn record_pdp_error(error_type: &str) {
    counter!("pep_pdp_errors_total", 1, "type" => error_type.to_string());
}

/// Storage for Prometheus handle
static PROMETHEUS_HANDLE: std::sync::OnceLock<metrics_exporter_prometheus::PrometheusHandle> =
    std::sync::OnceLock::new();

/// Initialize Prometheus exporter and return the handle
pub fn init_prometheus() -> anyhow::Result<()> {
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let handle = builder.install_recorder()?;
    PROMETHEUS_HANDLE
        .set(handle)
        .map_err(|_| anyhow::anyhow!("Failed to set Prometheus handle"))?;
    Ok(())
}

/// Get Prometheus metrics string
pub fn get_prometheus_metrics() -> String {
    PROMETHEUS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Prometheus metrics not initialized\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder() {
        // No recorder installed: the macros are no-ops
        record_authorization("allow");
        record_pdp_latency(0.004);
        record_pdp_error("pdp_status");
    }
}
