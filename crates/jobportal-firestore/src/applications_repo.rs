//! Application repository for the `applicants` collection.

use std::collections::HashMap;

use tracing::{info, warn};

use jobportal_models::{is_valid_document_id, Application, NewApplication, UpdateAck};

use crate::client::FirestoreClient;
use crate::convert::{from_document, to_fields};
use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::record_decode_failure;
use crate::types::{Document, Filter, StructuredQuery, ToFirestoreValue};

/// Repository for application documents.
#[derive(Clone)]
pub struct ApplicationRepository {
    client: FirestoreClient,
    collection: String,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Applications submitted by this applicant.
    pub async fn list_by_applicant(&self, email: &str) -> FirestoreResult<Vec<Application>> {
        self.list_where("applicant_email", email).await
    }

    /// Applications submitted for this job.
    pub async fn list_by_job(&self, job_id: &str) -> FirestoreResult<Vec<Application>> {
        self.list_where("job_id", job_id).await
    }

    async fn list_where(&self, field: &str, value: &str) -> FirestoreResult<Vec<Application>> {
        let mut query = StructuredQuery::collection(&self.collection);
        query.r#where = Some(Filter::field(field, "EQUAL", value.to_firestore_value()));

        let docs = self.client.run_query(&self.collection, query).await?;
        Ok(self.decode_all(&docs))
    }

    fn decode_all(&self, docs: &[Document]) -> Vec<Application> {
        docs.iter()
            .filter_map(|doc| match from_document::<Application>(doc) {
                Ok(application) => Some(application),
                Err(e) => {
                    warn!(
                        "Skipping undecodable application document {}: {}",
                        doc.id().unwrap_or("<unnamed>"),
                        e
                    );
                    record_decode_failure(&self.collection);
                    None
                }
            })
            .collect()
    }

    /// Store a new application and return its generated ID.
    pub async fn insert(&self, application: &NewApplication) -> FirestoreResult<String> {
        let fields = to_fields(application)?;
        let doc = self.client.create_document(&self.collection, fields).await?;
        let id = doc.id().map(str::to_string).ok_or_else(|| {
            FirestoreError::InvalidResponse("created application has no name".into())
        })?;

        info!(
            "Created application {} by {} for job {}",
            id, application.applicant_email, application.job_id
        );
        Ok(id)
    }

    /// Set the status of an application, leaving every other field untouched.
    pub async fn update_status(&self, id: &str, status: &str) -> FirestoreResult<UpdateAck> {
        if !is_valid_document_id(id) {
            return Ok(UpdateAck::unmatched());
        }

        let fields = HashMap::from([("status".to_string(), status.to_firestore_value())]);
        let updated = self
            .client
            .patch_document(&self.collection, id, fields, &["status"], true)
            .await?;

        Ok(match updated {
            Some(_) => UpdateAck::matched(),
            None => UpdateAck::unmatched(),
        })
    }
}
