//! Axum HTTP API server for the job portal.
//!
//! This crate provides:
//! - Job listing with employer, location and salary filters
//! - Application submission with atomic applicant counting
//! - Cookie-based JWT sessions gating an applicant's own applications
//! - Security headers, CORS and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::{PortalStore, StoreError, StoreResult};
