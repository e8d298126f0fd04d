//! Job listing filter.
//!
//! Translates the optional listing parameters into a store-independent
//! predicate plus sort order. Store clients translate what they can into
//! native queries and use [`JobFilter::matches`] for the rest.

use std::cmp::Ordering;

use crate::Job;

/// Inclusive salary bounds: the job's whole range must fit inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryBounds {
    /// Floor for `salaryRange.min`
    pub min: i64,
    /// Ceiling for `salaryRange.max`
    pub max: i64,
}

/// Ordering applied to listed jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobSort {
    /// Whatever order the store returns
    #[default]
    StoreDefault,
    /// `salaryRange.max`, highest first
    SalaryMaxDescending,
}

/// Filter and sort for `GET /jobs`. All present conditions are AND-combined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JobFilter {
    pub employer_email: Option<String>,
    pub location_search: Option<String>,
    pub salary: Option<SalaryBounds>,
    pub sort: JobSort,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only jobs posted by this employer. Empty input adds no condition.
    pub fn employer_email(mut self, email: Option<String>) -> Self {
        self.employer_email = email.filter(|e| !e.is_empty());
        self
    }

    /// Case-insensitive substring match on location. Empty input adds no condition.
    pub fn location_search(mut self, search: Option<String>) -> Self {
        self.location_search = search.filter(|s| !s.is_empty());
        self
    }

    /// Salary bounds apply only when both ends are given; a lone bound is ignored.
    pub fn salary_bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.salary = match (min, max) {
            (Some(min), Some(max)) => Some(SalaryBounds { min, max }),
            _ => None,
        };
        self
    }

    pub fn sort_by_salary_desc(mut self, enabled: bool) -> Self {
        self.sort = if enabled {
            JobSort::SalaryMaxDescending
        } else {
            JobSort::StoreDefault
        };
        self
    }

    /// True when no condition restricts the result set.
    pub fn is_unfiltered(&self) -> bool {
        self.employer_email.is_none() && self.location_search.is_none() && self.salary.is_none()
    }

    /// Evaluate the whole predicate against a job.
    pub fn matches(&self, job: &Job) -> bool {
        self.matches_employer(job) && self.matches_location(job) && self.matches_salary(job)
    }

    pub fn matches_employer(&self, job: &Job) -> bool {
        match &self.employer_email {
            Some(email) => job.hr_email.as_deref() == Some(email.as_str()),
            None => true,
        }
    }

    pub fn matches_location(&self, job: &Job) -> bool {
        match &self.location_search {
            Some(search) => job
                .location
                .as_deref()
                .map(|loc| loc.to_lowercase().contains(&search.to_lowercase()))
                .unwrap_or(false),
            None => true,
        }
    }

    pub fn matches_salary(&self, job: &Job) -> bool {
        match &self.salary {
            Some(bounds) => job
                .salary_range
                .as_ref()
                .and_then(|r| Some((r.min()?, r.max()?)))
                .map(|(min, max)| min >= bounds.min as f64 && max <= bounds.max as f64)
                .unwrap_or(false),
            None => true,
        }
    }

    /// Apply the sort order in place. Jobs without a numeric salary maximum sort last.
    pub fn sort_jobs(&self, jobs: &mut [Job]) {
        if self.sort == JobSort::SalaryMaxDescending {
            jobs.sort_by(|a, b| {
                let a = a.salary_range.as_ref().and_then(|r| r.max());
                let b = b.salary_range.as_ref().and_then(|r| r.max());
                match (a, b) {
                    (Some(a), Some(b)) => b.total_cmp(&a),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn job(id: &str, email: &str, location: &str, min: i64, max: i64) -> Job {
        serde_json::from_value(json!({
            "_id": id,
            "hr_email": email,
            "location": location,
            "salaryRange": {"min": min, "max": max}
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = JobFilter::new();
        assert!(filter.is_unfiltered());
        assert!(filter.matches(&job("1", "a@x.com", "Dhaka", 1, 2)));
        let bare: Job = serde_json::from_value(json!({"_id": "2"})).unwrap();
        assert!(filter.matches(&bare));
    }

    #[test]
    fn test_employer_email_is_exact() {
        let filter = JobFilter::new().employer_email(Some("hr@acme.io".into()));
        assert!(filter.matches(&job("1", "hr@acme.io", "Dhaka", 1, 2)));
        assert!(!filter.matches(&job("2", "HR@acme.io", "Dhaka", 1, 2)));
    }

    #[test]
    fn test_location_is_case_insensitive_substring() {
        let filter = JobFilter::new().location_search(Some("dhAKa".into()));
        assert!(filter.matches(&job("1", "a@x.com", "Gulshan, Dhaka", 1, 2)));
        assert!(!filter.matches(&job("2", "a@x.com", "Chittagong", 1, 2)));
    }

    #[test]
    fn test_salary_range_must_fit_inside_bounds() {
        let filter = JobFilter::new().salary_bounds(Some(100), Some(200));
        assert!(filter.matches(&job("1", "a@x.com", "x", 120, 180)));
        assert!(filter.matches(&job("2", "a@x.com", "x", 100, 200)));
        assert!(!filter.matches(&job("3", "a@x.com", "x", 150, 250)));
        assert!(!filter.matches(&job("4", "a@x.com", "x", 50, 150)));
        let no_range: Job = serde_json::from_value(json!({"_id": "5"})).unwrap();
        assert!(!filter.matches(&no_range));
    }

    #[test]
    fn test_single_salary_bound_is_ignored() {
        assert_eq!(JobFilter::new().salary_bounds(Some(100), None).salary, None);
        assert_eq!(JobFilter::new().salary_bounds(None, Some(200)).salary, None);
        assert!(JobFilter::new().salary_bounds(Some(100), None).is_unfiltered());
    }

    #[test]
    fn test_empty_strings_add_no_condition() {
        let filter = JobFilter::new()
            .employer_email(Some(String::new()))
            .location_search(Some(String::new()));
        assert!(filter.is_unfiltered());
    }

    #[test]
    fn test_conditions_are_and_combined() {
        let filter = JobFilter::new()
            .employer_email(Some("hr@acme.io".into()))
            .location_search(Some("berlin".into()))
            .salary_bounds(Some(10), Some(100));
        assert!(filter.matches(&job("1", "hr@acme.io", "Berlin", 20, 90)));
        assert!(!filter.matches(&job("2", "hr@acme.io", "Paris", 20, 90)));
        assert!(!filter.matches(&job("3", "other@acme.io", "Berlin", 20, 90)));
        assert!(!filter.matches(&job("4", "hr@acme.io", "Berlin", 5, 90)));
    }

    #[test]
    fn test_sort_by_salary_max_descending() {
        let mut jobs = vec![
            job("low", "a@x.com", "x", 1, 10),
            serde_json::from_value(json!({"_id": "none"})).unwrap(),
            job("high", "a@x.com", "x", 1, 99),
            job("mid", "a@x.com", "x", 1, 50),
        ];
        JobFilter::new().sort_by_salary_desc(true).sort_jobs(&mut jobs);
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low", "none"]);
    }

    #[test]
    fn test_non_integer_salaries_filter_and_sort() {
        let double: Job = serde_json::from_value(json!({
            "_id": "double",
            "salaryRange": {"min": 120.5, "max": 180.25}
        }))
        .unwrap();
        let text: Job = serde_json::from_value(json!({
            "_id": "text",
            "salaryRange": {"min": "120", "max": "180"}
        }))
        .unwrap();

        let filter = JobFilter::new().salary_bounds(Some(100), Some(200));
        assert!(filter.matches(&double));
        assert!(!filter.matches(&text));

        let mut jobs = vec![text, job("int", "a@x.com", "x", 1, 500), double];
        JobFilter::new().sort_by_salary_desc(true).sort_jobs(&mut jobs);
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["int", "double", "text"]);
    }

    #[test]
    fn test_store_default_order_is_untouched() {
        let mut jobs = vec![job("b", "a@x.com", "x", 1, 10), job("a", "a@x.com", "x", 1, 99)];
        JobFilter::new().sort_jobs(&mut jobs);
        assert_eq!(jobs[0].id, "b");
    }
}
