//! Shared fixtures for API tests: an in-memory store and request helpers.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tower::ServiceExt;

use jobportal_api::store::{PortalStore, StoreError, StoreResult};
use jobportal_api::{create_router, ApiConfig, AppState};
use jobportal_models::{
    is_valid_document_id, Application, Job, JobFilter, NewApplication, NewJob, UpdateAck,
};

pub const TEST_SECRET: &str = "test-secret";

/// In-memory [`PortalStore`] with the same observable semantics as Firestore.
#[derive(Default)]
pub struct MemoryStore {
    jobs: Mutex<Vec<Job>>,
    applications: Mutex<Vec<Application>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every subsequent call fail with a backend error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Backend("store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn generate_id(&self) -> String {
        format!("doc{:06}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Seed a job document directly, returning its ID.
    pub async fn seed_job(&self, fields: Value) -> String {
        let id = self.generate_id();
        let job = with_id::<Job>(fields, &id);
        self.jobs.lock().await.push(job);
        id
    }

    /// Seed an application document directly, returning its ID.
    pub async fn seed_application(&self, fields: Value) -> String {
        let id = self.generate_id();
        let application = with_id::<Application>(fields, &id);
        self.applications.lock().await.push(application);
        id
    }

    pub async fn job(&self, id: &str) -> Option<Job> {
        self.jobs.lock().await.iter().find(|j| j.id == id).cloned()
    }

    pub async fn application(&self, id: &str) -> Option<Application> {
        self.applications
            .lock()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }
}

fn with_id<T: DeserializeOwned>(fields: Value, id: &str) -> T {
    let mut fields = fields;
    fields["_id"] = json!(id);
    serde_json::from_value(fields).expect("fixture document")
}

fn to_value<T: serde::Serialize>(value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|e| StoreError::Backend(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|e| StoreError::Backend(e.to_string()))
}

#[async_trait]
impl PortalStore for MemoryStore {
    async fn list_jobs(&self, filter: &JobFilter) -> StoreResult<Vec<Job>> {
        self.check()?;
        let mut jobs: Vec<Job> = self
            .jobs
            .lock()
            .await
            .iter()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect();
        filter.sort_jobs(&mut jobs);
        Ok(jobs)
    }

    async fn insert_job(&self, job: &NewJob) -> StoreResult<String> {
        self.check()?;
        let id = self.generate_id();
        let mut fields = to_value(job)?;
        fields["_id"] = json!(id);
        self.jobs.lock().await.push(from_value(fields)?);
        Ok(id)
    }

    async fn get_job(&self, id: &str) -> StoreResult<Option<Job>> {
        self.check()?;
        if !is_valid_document_id(id) {
            return Ok(None);
        }
        Ok(self.job(id).await)
    }

    async fn list_applications_by_applicant(&self, email: &str) -> StoreResult<Vec<Application>> {
        self.check()?;
        Ok(self
            .applications
            .lock()
            .await
            .iter()
            .filter(|a| a.applicant_email.as_deref() == Some(email))
            .cloned()
            .collect())
    }

    async fn list_applications_by_job(&self, job_id: &str) -> StoreResult<Vec<Application>> {
        self.check()?;
        Ok(self
            .applications
            .lock()
            .await
            .iter()
            .filter(|a| a.job_id.as_deref() == Some(job_id))
            .cloned()
            .collect())
    }

    async fn insert_application(&self, application: &NewApplication) -> StoreResult<String> {
        self.check()?;
        let id = self.generate_id();
        let mut fields = to_value(application)?;
        fields["_id"] = json!(id);
        self.applications.lock().await.push(from_value(fields)?);
        Ok(id)
    }

    async fn increment_application_count(&self, job_id: &str) -> StoreResult<bool> {
        self.check()?;
        let mut jobs = self.jobs.lock().await;
        match jobs.iter_mut().find(|j| j.id == job_id) {
            Some(job) => {
                job.application_count = Some(job.application_count.unwrap_or(0) + 1);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_application_status(&self, id: &str, status: &str) -> StoreResult<UpdateAck> {
        self.check()?;
        let mut applications = self.applications.lock().await;
        match applications.iter_mut().find(|a| a.id == id) {
            Some(application) => {
                application.status = Some(status.to_string());
                Ok(UpdateAck::matched())
            }
            None => Ok(UpdateAck::unmatched()),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check()
    }
}

pub fn test_config() -> ApiConfig {
    ApiConfig {
        jwt_secret: TEST_SECRET.to_string(),
        metrics_enabled: false,
        ..Default::default()
    }
}

pub fn test_router(store: Arc<MemoryStore>) -> Router {
    create_router(AppState::with_store(test_config(), store), None)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign in through `POST /jwt` and return the `token=...` cookie pair.
pub async fn sign_in(app: &Router, email: &str) -> String {
    let response = send(app, json_request("POST", "/jwt", json!({ "email": email }))).await;
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap()
        .to_string();
    set_cookie
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub fn job_fixture(hr_email: &str, location: &str, min: i64, max: i64) -> Value {
    json!({
        "title": format!("Engineer {}-{}", min, max),
        "hr_email": hr_email,
        "company": "Acme",
        "jobType": "Remote",
        "salaryRange": {"min": min, "max": max, "currency": "usd"},
        "location": location,
        "applicationDeadline": "2026-12-31"
    })
}
