//! API routes.

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::applications::{list_for_applicant, list_for_job, submit, update_status};
use crate::handlers::jobs::{create_job, get_job, list_jobs};
use crate::handlers::session::{end_session, issue_session};
use crate::handlers::{health, ready, root};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let session_routes = Router::new()
        .route("/jwt", post(issue_session))
        .route("/jwt/logout", post(end_session));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:id", get(get_job));

    let application_routes = Router::new()
        // Session-gated: the applicant's own applications
        .route("/job-application", get(list_for_applicant))
        .route("/job-applications", post(submit))
        .route("/job-applications/jobs/:job_id", get(list_for_job))
        .route("/job-applications/:id", patch(update_status));

    let health_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(session_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
