//! Prometheus metrics recording for sweeps and the alert lifecycle.
//!
//! Recording goes through the `metrics` facade, so every call site is a
//! lock-free atomic operation and a no-op when no recorder is installed
//! (unit tests never pay for it). The server installs the global Prometheus
//! recorder once at startup via [`init_prometheus`] and serves the rendered
//! exposition at `GET /metrics`.

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
pub use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::OnceLock;

use crate::alerts::{AlertSeverity, SweepSummary};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder, once per process, and returns a
/// handle for rendering the exposition text. Subsequent calls return the
/// existing handle.
///
/// # Errors
///
/// Returns an error string when the recorder cannot be installed (another
/// recorder already claimed the global slot).
pub fn init_prometheus() -> Result<PrometheusHandle, String> {
    if let Some(handle) = PROMETHEUS_HANDLE.get() {
        return Ok(handle.clone());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("failed to install Prometheus recorder: {e}"))?;
    let _ = PROMETHEUS_HANDLE.set(handle.clone());
    Ok(handle)
}

/// Records the outcome of one full sweep.
pub fn record_sweep(summary: &SweepSummary) {
    counter!("waggle_sweeps_total").increment(1);
    counter!("waggle_hives_checked_total").increment(summary.hives_checked as u64);
    counter!("waggle_hive_check_failures_total").increment(summary.hives_failed as u64);
    gauge!("waggle_last_sweep_issues").set(summary.issues_found as f64);
}

/// Records a per-checker evaluation failure.
pub fn record_checker_failure(checker: &'static str) {
    counter!("waggle_checker_failures_total", "checker" => checker).increment(1);
}

/// Records the creation of an alert.
pub fn record_alert_created(issue_type: &str, severity: AlertSeverity) {
    counter!(
        "waggle_alerts_created_total",
        "type" => issue_type.to_string(),
        "severity" => severity.as_str()
    )
    .increment(1);
}

/// Records an alert being superseded by a severity change.
pub fn record_alert_superseded(issue_type: &str) {
    counter!("waggle_alerts_superseded_total", "type" => issue_type.to_string()).increment(1);
}

/// Records alerts auto-resolved by an all-clear or an inspection event.
pub fn record_alerts_resolved(count: u64) {
    if count > 0 {
        counter!("waggle_alerts_resolved_total").increment(count);
    }
}

/// Records resolved alerts deleted by the retention purge.
pub fn record_alerts_purged(count: u64) {
    counter!("waggle_alerts_purged_total").increment(count);
}
