//! Metrics collection and Prometheus export.

use crate::models::Rating;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder once per process.
///
/// Later calls return the existing handle. If another recorder already owns
/// the global slot, a detached handle is kept so `/metrics` still renders.
pub fn init_metrics() -> &'static PrometheusHandle {
    METRICS_HANDLE.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            PrometheusBuilder::new().build_recorder().handle()
        }
    })
}

/// Current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

pub fn record_prediction(rating: Rating) {
    counter!("sentiment_predictions_total", "rating" => rating.to_string()).increment(1);
}

pub fn record_model_error(kind: &'static str) {
    counter!("sentiment_model_errors_total", "kind" => kind).increment(1);
}

pub fn record_db_query(operation: &'static str, started: Instant) {
    histogram!("sentiment_db_query_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
