//! Job applications.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::Job;

/// Field names the store owns, or that enrichment writes, on applications.
pub const RESERVED_APPLICATION_FIELDS: &[&str] =
    &["_id", "title", "company", "jobType", "applicationDeadline"];

/// A submitted application as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: String,

    /// Identifier of the job applied to. Not enforced: the job may be gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    // Copied from the referenced job when listing an applicant's applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(rename = "jobType", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,

    #[serde(rename = "applicationDeadline", default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,

    /// Resume link, cover letter, profile URLs, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Application {
    /// Copy display metadata from the referenced job onto this application.
    pub fn enrich_from(&mut self, job: &Job) {
        self.title = job.title.clone();
        self.company = job.company.clone();
        self.job_type = job.job_type.clone();
        self.application_deadline = job.application_deadline.clone();
    }
}

/// Payload for submitting an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewApplication {
    #[validate(length(min = 1, max = 1500))]
    pub job_id: String,

    #[validate(email)]
    pub applicant_email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewApplication {
    /// Validate the payload, returning a client-facing message on failure.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;

        if let Some(field) = RESERVED_APPLICATION_FIELDS
            .iter()
            .find(|f| self.extra.contains_key(**f))
        {
            return Err(format!("{} cannot be set by the client", field));
        }

        Ok(())
    }
}

/// Payload for `PATCH /job-applications/:id`.
///
/// Any non-empty status string is accepted; there is no fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StatusUpdate {
    #[validate(length(min = 1, max = 100))]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job() -> Job {
        serde_json::from_value(json!({
            "_id": "job-1",
            "title": "Data Engineer",
            "company": "Globex",
            "jobType": "Hybrid",
            "applicationDeadline": "2026-11-30",
            "location": "Berlin"
        }))
        .unwrap()
    }

    #[test]
    fn test_enrich_copies_job_metadata_only() {
        let mut app: Application = serde_json::from_value(json!({
            "_id": "app-1",
            "job_id": "job-1",
            "applicant_email": "a@x.com",
            "resume": "https://cv.example/a.pdf"
        }))
        .unwrap();

        app.enrich_from(&job());

        let out = serde_json::to_value(&app).unwrap();
        assert_eq!(out["title"], "Data Engineer");
        assert_eq!(out["company"], "Globex");
        assert_eq!(out["jobType"], "Hybrid");
        assert_eq!(out["applicationDeadline"], "2026-11-30");
        assert_eq!(out["resume"], "https://cv.example/a.pdf");
        assert!(out.get("location").is_none());
    }

    #[test]
    fn test_unenriched_application_omits_job_fields() {
        let app: Application = serde_json::from_value(json!({
            "_id": "app-2",
            "job_id": "gone",
            "applicant_email": "a@x.com"
        }))
        .unwrap();
        let out = serde_json::to_value(&app).unwrap();
        assert!(out.get("title").is_none());
        assert!(out.get("company").is_none());
    }

    #[test]
    fn test_new_application_validation() {
        let ok: NewApplication = serde_json::from_value(json!({
            "job_id": "job-1",
            "applicant_email": "a@x.com",
            "github": "https://github.com/a"
        }))
        .unwrap();
        assert!(ok.check().is_ok());

        let bad_email: NewApplication = serde_json::from_value(json!({
            "job_id": "job-1",
            "applicant_email": "nope"
        }))
        .unwrap();
        assert!(bad_email.check().is_err());

        let reserved: NewApplication = serde_json::from_value(json!({
            "job_id": "job-1",
            "applicant_email": "a@x.com",
            "title": "spoofed"
        }))
        .unwrap();
        assert!(reserved.check().is_err());
    }

    #[test]
    fn test_status_update_accepts_any_non_empty_status() {
        let update = StatusUpdate { status: "Set Interview".into() };
        assert!(update.validate().is_ok());

        let empty = StatusUpdate { status: String::new() };
        assert!(empty.validate().is_err());
    }
}
