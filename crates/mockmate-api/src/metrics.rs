//! Prometheus metrics.
//!
//! Metric names live in [`names`] so dashboards and alerts have a single
//! place to reference. Recording helpers keep label construction out of
//! the handlers.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Install the global Prometheus recorder and return the render handle.
///
/// Must be called once, before any metric is recorded.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

pub mod names {
    pub const WS_CONNECTIONS_ACTIVE: &str = "mockmate_ws_connections_active";
    pub const WS_CONNECTIONS_TOTAL: &str = "mockmate_ws_connections_total";
    pub const WS_REPLIES_TOTAL: &str = "mockmate_ws_replies_total";
    pub const FRAMES_PROCESSED_TOTAL: &str = "mockmate_frames_processed_total";
    pub const SESSIONS_CALIBRATED_TOTAL: &str = "mockmate_sessions_calibrated_total";
    pub const FRAME_PROCESSING_DURATION: &str = "mockmate_frame_processing_duration_seconds";
    pub const HTTP_REQUESTS_TOTAL: &str = "mockmate_http_requests_total";
    pub const HTTP_REQUEST_DURATION: &str = "mockmate_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "mockmate_http_requests_in_flight";
    pub const RATE_LIMIT_HITS_TOTAL: &str = "mockmate_rate_limit_hits_total";
}

pub fn set_ws_active_connections(count: i64) {
    gauge!(names::WS_CONNECTIONS_ACTIVE).set(count as f64);
}

pub fn record_ws_connection(endpoint: &str) {
    let labels = [("endpoint", endpoint.to_string())];
    counter!(names::WS_CONNECTIONS_TOTAL, &labels).increment(1);
}

/// Count one outbound analysis reply, labeled by reply kind
/// (classification, calibrating, no_face, bad_image, analysis_error).
pub fn record_ws_reply(kind: &'static str) {
    let labels = [("kind", kind)];
    counter!(names::WS_REPLIES_TOTAL, &labels).increment(1);
}

pub fn record_frame_processed() {
    counter!(names::FRAMES_PROCESSED_TOTAL).increment(1);
}

pub fn record_session_calibrated() {
    counter!(names::SESSIONS_CALIBRATED_TOTAL).increment(1);
}

pub fn record_frame_duration(seconds: f64) {
    histogram!(names::FRAME_PROCESSING_DURATION).record(seconds);
}

pub fn record_rate_limit_hit(path: &str) {
    let labels = [("path", path.to_string())];
    counter!(names::RATE_LIMIT_HITS_TOTAL, &labels).increment(1);
}

/// HTTP request counter/duration/in-flight middleware.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
    let response = next.run(request).await;
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let labels = [
        ("method", method),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION, &labels).record(start.elapsed().as_secs_f64());

    response
}
