//! Firestore REST API client.
//!
//! This crate provides:
//! - Typed repositories for the `jobs` and `applicants` collections
//! - Structured queries built from the job listing filter
//! - Atomic field-transform increments for applicant counts
//! - Service account authentication via gcp_auth (or an emulator host)
//! - Retry with backoff, tracing spans and request metrics

pub mod applications_repo;
pub mod client;
pub mod convert;
pub mod error;
pub mod jobs_repo;
pub mod metrics;
pub mod retry;
pub mod store;
pub mod token_cache;
pub mod types;


pub use applications_repo::ApplicationRepository;
pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use jobs_repo::JobRepository;
pub use retry::RetryConfig;
pub use store::{CollectionNames, FirestoreStore};
pub use types::{Document, FromFirestoreValue, StructuredQuery, ToFirestoreValue, Value};
