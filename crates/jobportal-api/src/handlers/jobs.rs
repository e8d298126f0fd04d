//! Job listing, creation and lookup.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

use jobportal_models::{InsertAck, Job, JobFilter, NewJob};

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::metrics::record_job_created;
use crate::state::AppState;

/// Query parameters for `GET /jobs`.
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    /// Employer email
    pub email: Option<String>,
    /// `"true"` sorts by salary maximum, highest first
    pub sort: Option<String>,
    /// Case-insensitive location substring
    pub search: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

impl JobListQuery {
    /// Build the listing filter. Non-numeric salary bounds are rejected.
    pub fn into_filter(self) -> ApiResult<JobFilter> {
        let min = parse_bound("min", self.min.as_deref())?;
        let max = parse_bound("max", self.max.as_deref())?;

        Ok(JobFilter::new()
            .employer_email(self.email)
            .location_search(self.search)
            .salary_bounds(min, max)
            .sort_by_salary_desc(self.sort.as_deref() == Some("true")))
    }
}

fn parse_bound(name: &str, raw: Option<&str>) -> ApiResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| {
                ApiError::bad_request(format!("{} must be an integer, got {:?}", name, s))
            }),
    }
}

/// GET /jobs
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Json<Vec<Job>>> {
    let filter = query.into_filter()?;
    debug!("list_jobs filter={:?}", filter);

    let jobs = state.store.list_jobs(&filter).await?;
    Ok(Json(jobs))
}

/// POST /jobs
pub async fn create_job(
    State(state): State<AppState>,
    JsonBody(job): JsonBody<NewJob>,
) -> ApiResult<Json<InsertAck>> {
    job.check().map_err(ApiError::BadRequest)?;

    let id = state.store.insert_job(&job).await?;
    record_job_created();
    info!("create_job id={} hr_email={}", id, job.hr_email);

    Ok(Json(InsertAck::new(id)))
}

/// GET /jobs/:id
///
/// Unknown and malformed IDs both return `null`.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<Job>>> {
    Ok(Json(state.store.get_job(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobportal_models::{JobSort, SalaryBounds};

    fn query(min: Option<&str>, max: Option<&str>) -> JobListQuery {
        JobListQuery {
            min: min.map(String::from),
            max: max.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_both_bounds_build_salary_filter() {
        let filter = query(Some("100"), Some(" 200 ")).into_filter().unwrap();
        assert_eq!(filter.salary, Some(SalaryBounds { min: 100, max: 200 }));
    }

    #[test]
    fn test_single_bound_is_ignored() {
        let filter = query(Some("100"), None).into_filter().unwrap();
        assert!(filter.salary.is_none());
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_non_numeric_bound_is_bad_request() {
        let err = query(Some("lots"), Some("200")).into_filter().unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_sort_only_on_literal_true() {
        let sorted = JobListQuery {
            sort: Some("true".into()),
            ..Default::default()
        };
        assert_eq!(sorted.into_filter().unwrap().sort, JobSort::SalaryMaxDescending);

        let unsorted = JobListQuery {
            sort: Some("1".into()),
            ..Default::default()
        };
        assert_eq!(unsorted.into_filter().unwrap().sort, JobSort::StoreDefault);
    }

    #[test]
    fn test_empty_params_add_no_conditions() {
        let filter = JobListQuery {
            email: Some(String::new()),
            search: Some(String::new()),
            min: Some(String::new()),
            max: Some(String::new()),
            sort: None,
        }
        .into_filter()
        .unwrap();
        assert!(filter.is_unfiltered());
    }
}
