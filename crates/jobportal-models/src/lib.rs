//! Shared data models for the job portal backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job postings and their create payloads
//! - Job applications, status updates and job enrichment
//! - The job listing filter (query builder)
//! - Store acknowledgements and document identifiers

pub mod ack;
pub mod application;
pub mod filter;
pub mod id;
pub mod job;

// Re-export common types
pub use ack::{InsertAck, UpdateAck};
pub use application::{Application, NewApplication, StatusUpdate};
pub use filter::{JobFilter, JobSort, SalaryBounds};
pub use id::is_valid_document_id;
pub use job::{Job, NewJob, SalaryRange, StoredSalaryRange};
