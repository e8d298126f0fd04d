//! Job postings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Field names the store owns; clients may not set them on create.
pub const RESERVED_JOB_FIELDS: &[&str] = &["_id", "applicationCount"];

/// Salary range offered for a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SalaryRange {
    #[validate(range(min = 0))]
    pub min: i64,
    #[validate(range(min = 0))]
    pub max: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Salary range as found on a stored job.
///
/// Documents written out of band may carry doubles, strings, a single bound
/// or no map at all, so the raw value is kept and read leniently. Only
/// numeric bounds take part in filtering and sorting, as in a typed store
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredSalaryRange(pub Value);

impl StoredSalaryRange {
    pub fn min(&self) -> Option<f64> {
        self.bound("min")
    }

    pub fn max(&self) -> Option<f64> {
        self.bound("max")
    }

    fn bound(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }
}

/// A job posting as stored.
///
/// Every field except the identifier is optional: documents written out of
/// band are returned as they are rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Employer identity (email of the posting HR contact)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr_email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(rename = "jobType", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,

    #[serde(rename = "salaryRange", default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<StoredSalaryRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "applicationDeadline", default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,

    /// Number of applications submitted; absent until the first one
    #[serde(rename = "applicationCount", default, skip_serializing_if = "Option::is_none")]
    pub application_count: Option<u64>,

    /// Any other posted fields (description, requirements, logo, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewJob {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(email)]
    pub hr_email: String,

    #[validate(length(min = 1, max = 300))]
    pub company: String,

    #[serde(rename = "jobType", default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,

    #[serde(rename = "salaryRange", default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub salary_range: Option<SalaryRange>,

    #[validate(length(min = 1, max = 300))]
    pub location: String,

    #[serde(rename = "applicationDeadline", default, skip_serializing_if = "Option::is_none")]
    pub application_deadline: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewJob {
    /// Validate the payload, returning a client-facing message on failure.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|e| e.to_string())?;

        if let Some(range) = &self.salary_range {
            if range.min > range.max {
                return Err("salaryRange.min must not exceed salaryRange.max".to_string());
            }
        }

        if let Some(field) = RESERVED_JOB_FIELDS
            .iter()
            .find(|f| self.extra.contains_key(**f))
        {
            return Err(format!("{} cannot be set by the client", field));
        }

        Ok(())
    }
}
