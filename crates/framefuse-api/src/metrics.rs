//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "framefuse_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "framefuse_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "framefuse_http_requests_in_flight";

    pub const RENDERS_TOTAL: &str = "framefuse_renders_total";
    pub const RENDERS_FAILED_TOTAL: &str = "framefuse_renders_failed_total";
    pub const RENDER_DURATION_SECONDS: &str = "framefuse_render_duration_seconds";
    pub const DOWNLOAD_DURATION_SECONDS: &str = "framefuse_download_duration_seconds";

    pub const RATE_LIMIT_HITS_TOTAL: &str = "framefuse_rate_limit_hits_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a completed render.
pub fn record_render(layout: &str, duration_secs: f64) {
    let labels = [("layout", layout.to_string())];
    counter!(names::RENDERS_TOTAL, &labels).increment(1);
    histogram!(names::RENDER_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a failed render.
pub fn record_render_failed(layout: &str) {
    let labels = [("layout", layout.to_string())];
    counter!(names::RENDERS_FAILED_TOTAL, &labels).increment(1);
}

/// Record source download duration.
pub fn record_download_duration(duration_secs: f64) {
    histogram!(names::DOWNLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record rate limit hit.
pub fn record_rate_limit_hit(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// Collapse produced file names so the path label stays low-cardinality.
fn sanitize_path(path: &str) -> String {
    match path.strip_prefix("/uploads/") {
        Some(rest) if !rest.is_empty() => "/uploads/:file".to_string(),
        _ => path.to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();
    record_http_request(&method, &path, status, duration);

    response
}
