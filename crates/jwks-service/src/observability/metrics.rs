//! Metrics definitions for the JWKS service
//!
//! All metrics follow Prometheus naming conventions:
//! - `jwks_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `flow`: 2 values (active, expired)
//! - `status`: 2 values (success, error)
//! - `error_code`: bounded by `JwksError` variants

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and return the handle that renders `/metrics`.
///
/// # Errors
///
/// Returns error if the recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // Token signing is a single RSA private-key operation
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_token_issuance".to_string()),
            &[
                0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250,
            ],
        )
        .map_err(|e| format!("Failed to set token issuance buckets: {e}"))?
        // RSA key generation ranges from tens of ms to several seconds
        .set_buckets_for_metric(
            Matcher::Prefix("jwks_key_generation".to_string()),
            &[0.010, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000],
        )
        .map_err(|e| format!("Failed to set key generation buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// Token Metrics
// ============================================================================

/// Record token issuance duration and outcome
///
/// Metric: `jwks_token_issuance_duration_seconds`, `jwks_token_issuance_total`
/// Labels: `flow`, `status`
pub fn record_token_issuance(flow: &str, status: &str, duration: Duration) {
    histogram!("jwks_token_issuance_duration_seconds", "flow" => flow.to_string(), "status" => status.to_string())
        .record(duration.as_secs_f64());

    counter!("jwks_token_issuance_total", "flow" => flow.to_string(), "status" => status.to_string())
        .increment(1);
}

// ============================================================================
// Key Management Metrics
// ============================================================================

/// Record key generation outcome and duration
///
/// Metric: `jwks_key_generation_duration_seconds`, `jwks_key_generation_total`
/// Labels: `status`
pub fn record_key_generation(status: &str, duration: Duration) {
    histogram!("jwks_key_generation_duration_seconds").record(duration.as_secs_f64());
    counter!("jwks_key_generation_total", "status" => status.to_string()).increment(1);
}

// ============================================================================
// JWKS Metrics
// ============================================================================

/// Record a key set publication
///
/// Metric: `jwks_requests_total`
/// Labels: `filtered` (true, false)
pub fn record_jwks_request(filtered: bool) {
    counter!("jwks_requests_total", "filtered" => filtered.to_string()).increment(1);
}

// ============================================================================
// Error Metrics
// ============================================================================

/// Record error by code
///
/// Metric: `jwks_errors_total`
/// Labels: `operation`, `error_code`, `status_code`
pub fn record_error(operation: &str, error_code: &str, status_code: u16) {
    counter!("jwks_errors_total",
        "operation" => operation.to_string(),
        "error_code" => error_code.to_string(),
        "status_code" => status_code.to_string()
    )
    .increment(1);
}
