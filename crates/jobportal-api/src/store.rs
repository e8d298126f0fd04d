//! Document store seam used by the handlers.
//!
//! Handlers only see [`PortalStore`]; production wires in [`FirestoreStore`].

use async_trait::async_trait;
use thiserror::Error;

use jobportal_firestore::{FirestoreError, FirestoreStore};
use jobportal_models::{Application, Job, JobFilter, NewApplication, NewJob, UpdateAck};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Firestore(#[from] FirestoreError),

    #[error("{0}")]
    Backend(String),
}

/// Operations the job portal needs from its document store.
#[async_trait]
pub trait PortalStore: Send + Sync {
    /// Jobs matching the filter, in the filter's sort order.
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>>;

    /// Insert a job, returning its generated ID.
    async fn insert_job(&self, job: &NewJob) -> StoreResult<String>;

    /// A job by ID. Malformed and unknown IDs are both `None`.
    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>>;

    async fn list_applications_by_applicant(&self, email: &str) -> StoreResult<Vec<Application>>;

    async fn list_applications_by_job(&self, job_id: &str) -> StoreResult<Vec<Application>>;

    /// Insert an application, returning its generated ID.
    async fn insert_application(&self, application: &NewApplication) -> StoreResult<String>;

    /// Atomically add one to the job's application count. `false` if the job does not exist.
    async fn increment_application_count(&self, job_id: &str) -> StoreResult<bool>;

    /// Overwrite only the status of an application.
    async fn update_application_status(&self, id: &str, status: &str) -> StoreResult<UpdateAck>;

    /// Round trip used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
impl PortalStore for FirestoreStore {
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        Ok(self.jobs.list(filter).await?)
    }

    async fn insert_job(&self, job: &NewJob) -> StoreResult<String> {
        Ok(self.jobs.insert(job).await?)
    }

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        Ok(self.jobs.get(id).await?)
    }

    async fn list_applications_by_applicant(&self, email: &str) -> StoreResult<Vec<Application>> {
        Ok(self.applications.list_by_applicant(email).await?)
    }

    async fn list_applications_by_job(&self, job_id: &str) -> StoreResult<Vec<Application>> {
        Ok(self.applications.list_by_job(job_id).await?)
    }

    async fn insert_application(&self, application: &NewApplication) -> StoreResult<String> {
        Ok(self.applications.insert(application).await?)
    }

    async fn increment_application_count(&self, job_id: &str) -> StoreResult<bool> {
        Ok(self.jobs.increment_application_count(job_id).await?)
    }

    async fn update_application_status(&self, id: &str, status: &str) -> StoreResult<UpdateAck> {
        Ok(self.applications.update_status(id, status).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(FirestoreStore::ping(self).await?)
    }
}
