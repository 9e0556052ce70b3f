//! Prometheus metrics exposition
//!
//! - `image_fetcher_requests_total` (counter): labels `route`, `status`
//! - `image_fetcher_request_duration_seconds` (histogram): label `route`
//! - `image_fetcher_images_downloaded_total` (counter)
//! - `image_fetcher_errors_total` (counter): label `kind`

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Instant;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_METRIC: &str = "image_fetcher_request_duration_seconds";

/// Covers a fast `/images/...` hit up to a slow gallery download.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
];

/// In-process counters backing the `/health` endpoint.
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    pub requests_total: Arc<AtomicU64>,
    pub errors_total: Arc<AtomicU64>,
    pub started_at: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            requests_total: Arc::new(AtomicU64::new(0)),
            errors_total: Arc::new(AtomicU64::new(0)),
            started_at: Instant::now(),
        }
    }
}

fn builder() -> PrometheusBuilder {
    PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(DURATION_METRIC.to_string()), DURATION_BUCKETS)
        .expect("failed to set histogram buckets")
}

/// Install the global Prometheus recorder and return a handle for `/metrics`.
pub fn install_recorder() -> PrometheusHandle {
    builder()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

/// Handle backed by a recorder that is never installed globally.
#[cfg(test)]
pub fn detached_handle() -> PrometheusHandle {
    builder().build_recorder().handle()
}

/// Record a completed request by matched route and response status.
pub fn record_request(route: &str, status: u16, duration_secs: f64) {
    metrics::counter!(
        "image_fetcher_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(DURATION_METRIC, "route" => route.to_string()).record(duration_secs);
}

pub fn record_images_downloaded(count: usize) {
    metrics::counter!("image_fetcher_images_downloaded_total").increment(count as u64);
}

/// Record a failed request by error kind (auth, resolution, fetch, download, archive).
pub fn record_error(kind: &str) {
    metrics::counter!("image_fetcher_errors_total", "kind" => kind.to_string()).increment(1);
}
