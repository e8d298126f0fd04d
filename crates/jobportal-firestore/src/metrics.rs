//! Firestore metrics collection.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Total Firestore requests by operation, collection and status.
    pub const REQUESTS_TOTAL: &str = "jobportal_firestore_requests_total";

    /// Total retry attempts by operation.
    pub const RETRIES_TOTAL: &str = "jobportal_firestore_retries_total";

    /// Request latency in seconds by operation.
    pub const LATENCY_SECONDS: &str = "jobportal_firestore_latency_seconds";

    /// Documents returned by structured queries, by collection.
    pub const QUERY_DOCUMENTS_RETURNED_TOTAL: &str = "jobportal_firestore_query_documents_total";

    /// Stored documents that could not be decoded into the model, by collection.
    pub const DECODE_FAILURES_TOTAL: &str = "jobportal_firestore_decode_failures_total";
}

/// Record metrics for a completed Firestore request.
pub fn record_request(operation: &str, collection: &str, status: u16, latency_ms: f64) {
    counter!(
        names::REQUESTS_TOTAL,
        "operation" => operation.to_string(),
        "collection" => collection.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        names::LATENCY_SECONDS,
        "operation" => operation.to_string()
    )
    .record(latency_ms / 1000.0);
}

/// Record a retry attempt.
pub fn record_retry(operation: &str) {
    counter!(names::RETRIES_TOTAL, "operation" => operation.to_string()).increment(1);
}

pub fn record_query_documents(collection: &str, count: usize) {
    counter!(
        names::QUERY_DOCUMENTS_RETURNED_TOTAL,
        "collection" => collection.to_string()
    )
    .increment(count as u64);
}

pub fn record_decode_failure(collection: &str) {
    counter!(names::DECODE_FAILURES_TOTAL, "collection" => collection.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.contains("requests"));
        assert!(names::RETRIES_TOTAL.contains("retries"));
        assert!(names::LATENCY_SECONDS.contains("latency"));
        assert!(names::DECODE_FAILURES_TOTAL.starts_with("jobportal_"));
    }
}
