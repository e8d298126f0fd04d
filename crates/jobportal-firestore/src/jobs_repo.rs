//! Job repository for the `jobs` collection.

use tracing::{debug, info, warn};

use jobportal_models::{is_valid_document_id, Job, JobFilter, NewJob};

use crate::client::FirestoreClient;
use crate::convert::{from_document, to_fields};
use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::record_decode_failure;
use crate::types::{
    DocumentTransform, Filter, FieldTransform, Precondition, StructuredQuery, ToFirestoreValue,
    Write,
};

/// Field incremented on every submitted application.
pub const APPLICATION_COUNT_FIELD: &str = "applicationCount";

/// Translate the store-expressible part of a job filter into a structured query.
///
/// The location search has no Firestore equivalent and is applied to the
/// returned documents by [`JobRepository::list`]. So is the salary sort: an
/// `orderBy` would drop documents that lack the ordered field.
pub fn build_query(filter: &JobFilter, collection: &str) -> StructuredQuery {
    let mut conditions = Vec::new();

    if let Some(email) = &filter.employer_email {
        conditions.push(Filter::field(
            "hr_email",
            "EQUAL",
            email.as_str().to_firestore_value(),
        ));
    }

    if let Some(bounds) = filter.salary {
        conditions.push(Filter::field(
            "salaryRange.min",
            "GREATER_THAN_OR_EQUAL",
            bounds.min.to_firestore_value(),
        ));
        conditions.push(Filter::field(
            "salaryRange.max",
            "LESS_THAN_OR_EQUAL",
            bounds.max.to_firestore_value(),
        ));
    }

    let mut query = StructuredQuery::collection(collection);
    query.r#where = Filter::and(conditions);
    query
}

/// Repository for job documents.
#[derive(Clone)]
pub struct JobRepository {
    client: FirestoreClient,
    collection: String,
}

impl JobRepository {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// List jobs matching the filter, in the filter's sort order.
    ///
    /// Documents that no longer decode as a job are skipped with a warning.
    pub async fn list(&self, filter: &JobFilter) -> FirestoreResult<Vec<Job>> {
        let query = build_query(filter, &self.collection);
        let docs = self.client.run_query(&self.collection, query).await?;

        let mut jobs: Vec<Job> = docs
            .iter()
            .filter_map(|doc| match from_document::<Job>(doc) {
                Ok(job) => Some(job),
                Err(e) => {
                    warn!(
                        "Skipping undecodable job document {}: {}",
                        doc.id().unwrap_or("<unnamed>"),
                        e
                    );
                    record_decode_failure(&self.collection);
                    None
                }
            })
            .filter(|job| filter.matches(job))
            .collect();
        filter.sort_jobs(&mut jobs);

        debug!("Listed {} jobs", jobs.len());
        Ok(jobs)
    }

    /// Store a new job and return its generated ID.
    pub async fn insert(&self, job: &NewJob) -> FirestoreResult<String> {
        let fields = to_fields(job)?;
        let doc = self.client.create_document(&self.collection, fields).await?;
        let id = doc
            .id()
            .map(str::to_string)
            .ok_or_else(|| FirestoreError::InvalidResponse("created job has no name".into()))?;

        info!("Created job {} for {}", id, job.hr_email);
        Ok(id)
    }

    /// Get a job by ID. Malformed IDs and documents that no longer decode as
    /// a job are treated as absent.
    pub async fn get(&self, job_id: &str) -> FirestoreResult<Option<Job>> {
        if !is_valid_document_id(job_id) {
            debug!("Rejecting malformed job id {:?}", job_id);
            return Ok(None);
        }

        let Some(doc) = self.client.get_document(&self.collection, job_id).await? else {
            return Ok(None);
        };
        match from_document::<Job>(&doc) {
            Ok(job) => Ok(Some(job)),
            Err(e) => {
                warn!("Job document {} does not decode: {}", job_id, e);
                record_decode_failure(&self.collection);
                Ok(None)
            }
        }
    }

    /// Atomically add one to the job's application count.
    ///
    /// Returns `false` when the job does not exist; the count is never
    /// created on a missing document.
    pub async fn increment_application_count(&self, job_id: &str) -> FirestoreResult<bool> {
        if !is_valid_document_id(job_id) {
            return Ok(false);
        }

        let write = Write {
            update: None,
            transform: Some(DocumentTransform {
                document: self.client.full_document_name(&self.collection, job_id),
                field_transforms: vec![FieldTransform {
                    field_path: APPLICATION_COUNT_FIELD.to_string(),
                    increment: Some(1i64.to_firestore_value()),
                }],
            }),
            update_mask: None,
            current_document: Some(Precondition {
                exists: Some(true),
                update_time: None,
            }),
        };

        match self.client.commit(vec![write]).await {
            Ok(_) => Ok(true),
            Err(FirestoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
