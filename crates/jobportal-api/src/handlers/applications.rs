//! Job application handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use futures_util::future::try_join_all;
use serde::Deserialize;
use tracing::{error, info, warn};
use validator::Validate;

use jobportal_models::{Application, InsertAck, Job, NewApplication, StatusUpdate, UpdateAck};

use crate::auth::SessionUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::metrics::{record_application_submitted, record_dangling_job_reference};
use crate::state::AppState;
use crate::store::{PortalStore, StoreResult};

#[derive(Debug, Deserialize)]
pub struct ApplicantQuery {
    pub email: Option<String>,
}

/// GET /job-application?email=
///
/// The signed-in applicant's own applications, each carrying the title,
/// company, job type and deadline of the job it references.
pub async fn list_for_applicant(
    State(state): State<AppState>,
    user: SessionUser,
    Query(query): Query<ApplicantQuery>,
) -> ApiResult<Json<Vec<Application>>> {
    user.require_email(query.email.as_deref())?;

    let mut applications = state
        .store
        .list_applications_by_applicant(&user.email)
        .await?;
    enrich_with_jobs(state.store.as_ref(), &mut applications).await?;

    info!(
        "list_for_applicant email={} count={}",
        user.email,
        applications.len()
    );
    Ok(Json(applications))
}

/// Copy job metadata onto each application. Applications whose job is gone
/// keep those fields absent.
async fn enrich_with_jobs(
    store: &dyn PortalStore,
    applications: &mut [Application],
) -> StoreResult<()> {
    let mut job_ids: Vec<&str> = applications
        .iter()
        .filter_map(|a| a.job_id.as_deref())
        .collect();
    job_ids.sort_unstable();
    job_ids.dedup();

    let lookups = try_join_all(job_ids.into_iter().map(|id| async move {
        store.get_job(id).await.map(|job| (id.to_string(), job))
    }))
    .await?;
    let jobs: HashMap<String, Option<Job>> = lookups.into_iter().collect();

    for application in applications.iter_mut() {
        let job = application
            .job_id
            .as_ref()
            .and_then(|id| jobs.get(id))
            .and_then(Option::as_ref);
        match job {
            Some(job) => application.enrich_from(job),
            None => {
                warn!(
                    "Application {} references missing job {:?}",
                    application.id, application.job_id
                );
                record_dangling_job_reference("enrich");
            }
        }
    }

    Ok(())
}

/// GET /job-applications/jobs/:job_id
pub async fn list_for_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Vec<Application>>> {
    let applications = state.store.list_applications_by_job(&job_id).await?;
    Ok(Json(applications))
}

/// POST /job-applications
///
/// Store the application, then add one to the job's application count.
/// A missing job leaves the count alone; the application is kept either way.
pub async fn submit(
    State(state): State<AppState>,
    JsonBody(application): JsonBody<NewApplication>,
) -> ApiResult<Json<InsertAck>> {
    application.check().map_err(ApiError::BadRequest)?;

    let id = state.store.insert_application(&application).await?;
    info!(
        "submit application id={} job_id={} applicant={}",
        id, application.job_id, application.applicant_email
    );

    let counted = match state
        .store
        .increment_application_count(&application.job_id)
        .await
    {
        Ok(true) => true,
        Ok(false) => {
            warn!(
                "Application {} references missing job {}; count not incremented",
                id, application.job_id
            );
            record_dangling_job_reference("increment");
            false
        }
        Err(e) => {
            error!(
                "Failed to increment application count for job {}: {}",
                application.job_id, e
            );
            false
        }
    };
    record_application_submitted(counted);

    Ok(Json(InsertAck::new(id)))
}

/// PATCH /job-applications/:id
///
/// Only `status` is written; any string value is accepted.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<StatusUpdate>,
) -> ApiResult<Json<UpdateAck>> {
    update
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let ack = state
        .store
        .update_application_status(&id, &update.status)
        .await?;
    info!(
        "update_status id={} status={} matched={}",
        id, update.status, ack.matched_count
    );

    Ok(Json(ack))
}
