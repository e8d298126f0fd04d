//! Prometheus metrics for the API server.

use std::sync::OnceLock;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use regex_lite::Regex;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "jobportal_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "jobportal_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "jobportal_http_requests_in_flight";

    // Domain metrics
    pub const SESSIONS_ISSUED_TOTAL: &str = "jobportal_sessions_issued_total";
    pub const JOBS_CREATED_TOTAL: &str = "jobportal_jobs_created_total";
    pub const APPLICATIONS_SUBMITTED_TOTAL: &str = "jobportal_applications_submitted_total";
    pub const DANGLING_JOB_REFERENCES_TOTAL: &str = "jobportal_dangling_job_references_total";
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

pub fn record_session_issued() {
    counter!(names::SESSIONS_ISSUED_TOTAL).increment(1);
}

pub fn record_job_created() {
    counter!(names::JOBS_CREATED_TOTAL).increment(1);
}

/// Record a submitted application and whether the job's count was incremented.
pub fn record_application_submitted(counted: bool) {
    let labels = [("counted", counted.to_string())];
    counter!(names::APPLICATIONS_SUBMITTED_TOTAL, &labels).increment(1);
}

/// Record an application whose job no longer exists.
pub fn record_dangling_job_reference(operation: &'static str) {
    counter!(names::DANGLING_JOB_REFERENCES_TOTAL, "operation" => operation).increment(1);
}

/// Checked in order; the first match wins.
fn path_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"^/job-applications/jobs/[^/]+$", "/job-applications/jobs/:job_id"),
            (r"^/job-applications/[^/]+$", "/job-applications/:id"),
            (r"^/jobs/[^/]+$", "/jobs/:id"),
        ]
        .into_iter()
        .filter_map(|(pattern, label)| Regex::new(pattern).ok().map(|re| (re, label)))
        .collect()
    })
}

/// Sanitize path for metrics labels (replace document IDs with placeholders).
fn sanitize_path(path: &str) -> String {
    path_patterns()
        .iter()
        .find(|(re, _)| re.is_match(path))
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| path.to_string())
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
