//! Metrics collection and exposition.
//!
//! # Metrics
//! - `failure_detector_samples_total` (counter): samples collected, by outcome
//! - `failure_detector_batches_total` (counter): batches processed
//! - `failure_detector_batch_size` (histogram): samples per batch
//! - `failure_detector_weight_changes_total` (counter): evaluator changes
//! - `failure_detector_snapshots_published_total` (counter)
//! - `failure_detector_snapshot_endpoints` (gauge): endpoints in the last snapshot
//! - `failure_detector_task_panics_total` (counter): contained panics, by stage
//! - `failure_detector_live_endpoints` (gauge): endpoints in the live tree
//! - `failure_detector_endpoint_weight` (gauge): current weight per endpoint
//!
//! Gauges idle for longer than the configured timeout are dropped from the
//! scrape output. Endpoint weights are refreshed on every batch that samples
//! the endpoint, so only evicted endpoints disappear.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use metrics_util::MetricKindMask;

fn exporter(idle_timeout: Duration) -> PrometheusBuilder {
    PrometheusBuilder::new().idle_timeout(MetricKindMask::GAUGE, Some(idle_timeout))
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr, idle_timeout: Duration) {
    match exporter(idle_timeout).with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_sample(failed: bool) {
    let outcome = if failed { "error" } else { "success" };
    counter!("failure_detector_samples_total", "outcome" => outcome).increment(1);
}

pub fn record_batch(size: usize) {
    counter!("failure_detector_batches_total").increment(1);
    histogram!("failure_detector_batch_size").record(size as f64);
}

pub fn record_weight_change() {
    counter!("failure_detector_weight_changes_total").increment(1);
}

pub fn record_endpoint_weight(service: &str, endpoint: &str, weight: f32) {
    gauge!(
        "failure_detector_endpoint_weight",
        "service" => service.to_string(),
        "endpoint" => endpoint.to_string()
    )
    .set(weight as f64);
}

pub fn record_snapshot(endpoints: usize) {
    counter!("failure_detector_snapshots_published_total").increment(1);
    gauge!("failure_detector_snapshot_endpoints").set(endpoints as f64);
}

pub fn record_live_endpoints(endpoints: usize) {
    gauge!("failure_detector_live_endpoints").set(endpoints as f64);
}

pub fn record_task_panic(stage: &'static str) {
    counter!("failure_detector_task_panics_total", "stage" => stage).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_endpoint_weight_leaves_scrape_output() {
        let recorder = exporter(Duration::from_millis(50)).build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_endpoint_weight("ns/svc", "10.0.0.1:80", 0.9);
            record_weight_change();
        });
        let rendered = handle.render();
        assert!(rendered.contains("failure_detector_endpoint_weight"));
        assert!(rendered.contains("10.0.0.1:80"));

        std::thread::sleep(Duration::from_millis(200));
        let rendered = handle.render();
        assert!(!rendered.contains("failure_detector_endpoint_weight"));
        // Counters are not subject to the idle timeout.
        assert!(rendered.contains("failure_detector_weight_changes_total"));
    }
}
