//! Prediction client metrics.
//!
//! Recorded through the `metrics` facade; the embedding application decides
//! whether an exporter is installed.

use metrics::{counter, histogram};

// =============================================================================
// Metric Names
// =============================================================================

/// Metric name constants for consistency.
pub mod names {
    /// Total prediction submissions by outcome.
    pub const PREDICTIONS_TOTAL: &str = "xray_predictions_total";

    /// End-to-end submission latency in seconds by outcome.
    pub const LATENCY_SECONDS: &str = "xray_prediction_latency_seconds";

    /// Total health probes by result.
    pub const HEALTH_CHECKS_TOTAL: &str = "xray_health_checks_total";
}

// =============================================================================
// Recording Functions
// =============================================================================

/// Record a finished submission. `outcome` is `"ok"` or an error kind.
pub fn record_prediction(outcome: &'static str, latency_ms: f64) {
    counter!(names::PREDICTIONS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::LATENCY_SECONDS, "outcome" => outcome).record(latency_ms / 1000.0);
}

/// Record a health probe.
pub fn record_health_check(healthy: bool) {
    let result = if healthy { "healthy" } else { "unhealthy" };
    counter!(names::HEALTH_CHECKS_TOTAL, "result" => result).increment(1);
}
