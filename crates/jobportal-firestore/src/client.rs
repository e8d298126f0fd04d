//! Firestore REST API client.
//!
//! - Token caching with refresh margin
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter for idempotent calls
//! - Observability (tracing spans, metrics)
//! - Emulator support via `FIRESTORE_EMULATOR_HOST`

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcp_auth::{CustomServiceAccount, TokenProvider};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, info_span, Instrument};

use crate::error::{FirestoreError, FirestoreResult};
use crate::metrics::{record_query_documents, record_request};
use crate::retry::{with_retry, RetryConfig};
use crate::token_cache::TokenCache;
use crate::types::{
    CommitRequest, CommitResponse, Document, RunQueryRequest, RunQueryResponse, StructuredQuery,
    Value, Write,
};

/// Project used against the emulator when none is configured.
const EMULATOR_DEFAULT_PROJECT: &str = "demo-jobportal";

// =============================================================================
// Configuration
// =============================================================================

/// Firestore client configuration.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// GCP project ID
    pub project_id: String,
    /// Database ID (usually "(default)")
    pub database_id: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Retry configuration
    pub retry: RetryConfig,
    /// `host:port` of a local emulator. Requests go over plain HTTP without auth.
    pub emulator_host: Option<String>,
}

impl FirestoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> FirestoreResult<Self> {
        let emulator_host = std::env::var("FIRESTORE_EMULATOR_HOST")
            .ok()
            .filter(|h| !h.is_empty());

        let project_id = match std::env::var("GCP_PROJECT_ID")
            .or_else(|_| std::env::var("FIREBASE_PROJECT_ID"))
        {
            Ok(id) if !id.is_empty() => id,
            _ if emulator_host.is_some() => EMULATOR_DEFAULT_PROJECT.to_string(),
            Ok(_) => {
                return Err(FirestoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID cannot be empty",
                ))
            }
            Err(_) => {
                return Err(FirestoreError::auth_error(
                    "GCP_PROJECT_ID or FIREBASE_PROJECT_ID must be set to access Firestore",
                ))
            }
        };

        let connect_timeout_secs: u64 = std::env::var("FIRESTORE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            project_id,
            database_id: std::env::var("FIRESTORE_DATABASE_ID")
                .unwrap_or_else(|_| "(default)".to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            retry: RetryConfig::from_env(),
            emulator_host,
        })
    }

    /// Config pointing at an emulator, with retries disabled.
    pub fn emulator(host: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: "(default)".to_string(),
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            retry: RetryConfig::none(),
            emulator_host: Some(host.into()),
        }
    }

    fn documents_url(&self) -> String {
        let origin = match &self.emulator_host {
            Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
                host.trim_end_matches('/').to_string()
            }
            Some(host) => format!("http://{}", host),
            None => "https://firestore.googleapis.com".to_string(),
        };
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            origin, self.project_id, self.database_id
        )
    }
}

// =============================================================================
// Client
// =============================================================================

/// Firestore REST API client.
#[derive(Clone)]
pub struct FirestoreClient {
    http: Client,
    config: FirestoreConfig,
    base_url: String,
    /// `None` when talking to the emulator.
    token_cache: Option<Arc<TokenCache>>,
}

impl FirestoreClient {
    /// Create a new Firestore client.
    pub async fn new(config: FirestoreConfig) -> FirestoreResult<Self> {
        let token_cache = match config.emulator_host {
            Some(ref host) => {
                info!("Using Firestore emulator at {}", host);
                None
            }
            None => Some(Arc::new(TokenCache::new(Self::create_auth_provider()?))),
        };

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("jobportal-firestore/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FirestoreError::Network)?;

        let base_url = config.documents_url();

        Ok(Self {
            http,
            config,
            base_url,
            token_cache,
        })
    }

    fn create_auth_provider() -> FirestoreResult<Arc<dyn TokenProvider>> {
        let service_account = CustomServiceAccount::from_env().map_err(|e| {
            FirestoreError::auth_error(format!("Failed to load service account: {}", e))
        })?;

        match service_account {
            Some(sa) => Ok(Arc::new(sa)),
            None => Err(FirestoreError::auth_error(
                "GOOGLE_APPLICATION_CREDENTIALS not set. \
                 Set it to the path of your service account JSON file.",
            )),
        }
    }

    /// Create from environment variables.
    pub async fn from_env() -> FirestoreResult<Self> {
        let config = FirestoreConfig::from_env()?;
        Self::new(config).await
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn is_access_token_expired(body: &str) -> bool {
        body.contains("ACCESS_TOKEN_EXPIRED") || body.contains("\"UNAUTHENTICATED\"")
    }

    /// URL of a single document. The ID is one path segment, so `?`, `#` and
    /// `%` are percent-encoded rather than read as URL syntax.
    fn document_path(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(doc_id)
        )
    }

    /// Full resource name, as used in commit writes.
    pub fn full_document_name(&self, collection: &str, doc_id: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.config.project_id, self.config.database_id, collection, doc_id
        )
    }

    /// Send a request with bearer auth, refreshing the token once if the
    /// server reports it expired.
    async fn send<B>(&self, build: B) -> FirestoreResult<Response>
    where
        B: Fn() -> RequestBuilder,
    {
        let Some(cache) = &self.token_cache else {
            return Ok(build().send().await?);
        };

        let token = cache.get_token().await?;
        let response = build().bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        if !Self::is_access_token_expired(&body) {
            return Err(FirestoreError::from_http_status(
                401,
                format!("{} failed: {}", url, body),
            ));
        }

        debug!("Access token rejected as expired, refreshing");
        cache.invalidate().await;
        let token = cache.get_token().await?;
        Ok(build().bearer_auth(&token).send().await?)
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Get a document. Returns `None` when it does not exist.
    pub async fn get_document(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> FirestoreResult<Option<Document>> {
        let url = &self.document_path(collection, doc_id);

        let attempt = with_retry(&self.config.retry, "get_document", move || async move {
            let response = self.send(|| self.http.get(url)).await?;
            match response.status() {
                StatusCode::OK => Ok(Some(response.json::<Document>().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, url, response).await),
            }
        });
        self.execute_request("get_document", collection, Some(doc_id), attempt)
            .await
    }

    /// Create a document with a store-generated ID.
    ///
    /// Sent once: a retried POST could insert the document twice.
    pub async fn create_document(
        &self,
        collection: &str,
        fields: HashMap<String, Value>,
    ) -> FirestoreResult<Document> {
        let url = &format!("{}/{}", self.base_url, collection);
        let body = &Document::new(fields);

        self.execute_request("create_document", collection, None, async {
            let response = self.send(|| self.http.post(url).json(body)).await?;
            match response.status() {
                StatusCode::OK | StatusCode::CREATED => Ok(response.json::<Document>().await?),
                status => Err(Self::handle_error_response(status, url, response).await),
            }
        })
        .await
    }

    /// Overwrite the masked fields of a document.
    ///
    /// With `must_exist` the write carries an `exists` precondition and a
    /// missing document yields `None` instead of being created.
    pub async fn patch_document(
        &self,
        collection: &str,
        doc_id: &str,
        fields: HashMap<String, Value>,
        update_mask: &[&str],
        must_exist: bool,
    ) -> FirestoreResult<Option<Document>> {
        let mut params: Vec<String> = update_mask
            .iter()
            .map(|f| format!("updateMask.fieldPaths={}", urlencoding::encode(f)))
            .collect();
        if must_exist {
            params.push("currentDocument.exists=true".to_string());
        }

        let mut url = self.document_path(collection, doc_id);
        if !params.is_empty() {
            url = format!("{}?{}", url, params.join("&"));
        }
        let url = &url;
        let body = &Document::new(fields);

        let attempt = with_retry(&self.config.retry, "patch_document", move || async move {
            let response = self.send(|| self.http.patch(url).json(body)).await?;
            match response.status() {
                StatusCode::OK => Ok(Some(response.json::<Document>().await?)),
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(Self::handle_error_response(status, url, response).await),
            }
        });
        self.execute_request("patch_document", collection, Some(doc_id), attempt)
            .await
    }

    /// Apply writes atomically.
    ///
    /// Not retried: field transforms such as increments are not idempotent.
    pub async fn commit(&self, writes: Vec<Write>) -> FirestoreResult<CommitResponse> {
        if writes.is_empty() {
            return Ok(CommitResponse {
                write_results: None,
                commit_time: None,
            });
        }

        let url = &format!("{}:commit", self.base_url);
        let request = &CommitRequest { writes };

        self.execute_request("commit", "commit", None, async {
            let response = self.send(|| self.http.post(url).json(request)).await?;
            match response.status() {
                StatusCode::OK => Ok(response.json::<CommitResponse>().await?),
                status => Err(Self::handle_error_response(status, url, response).await),
            }
        })
        .await
    }

    // =========================================================================
    // Query Operations
    // =========================================================================

    /// Run a structured query against a top-level collection.
    pub async fn run_query(
        &self,
        collection: &str,
        query: StructuredQuery,
    ) -> FirestoreResult<Vec<Document>> {
        let url = &format!("{}:runQuery", self.base_url);
        let request = &RunQueryRequest {
            structured_query: query,
        };

        let attempt = with_retry(&self.config.retry, "run_query", move || async move {
            let response = self.send(|| self.http.post(url).json(request)).await?;
            let status = response.status();
            if status != StatusCode::OK {
                return Err(Self::handle_error_response(status, url, response).await);
            }

            let body = response.text().await.unwrap_or_default();
            // runQuery streams a JSON array; an empty result still carries a readTime entry.
            let responses: Vec<RunQueryResponse> = serde_json::from_str(&body).map_err(|e| {
                FirestoreError::InvalidResponse(format!(
                    "Failed to parse runQuery response: {} (body prefix: {})",
                    e,
                    body.chars().take(200).collect::<String>()
                ))
            })?;

            Ok(responses
                .into_iter()
                .filter_map(|r| r.document)
                .collect::<Vec<_>>())
        });

        let docs = self
            .execute_request("run_query", collection, None, attempt)
            .await?;
        record_query_documents(collection, docs.len());
        Ok(docs)
    }

    /// Cheap round trip used by the readiness probe.
    pub async fn ping(&self) -> FirestoreResult<()> {
        self.get_document("_health", "_check").await.map(|_| ())
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    async fn execute_request<T, F>(
        &self,
        operation: &str,
        collection: &str,
        doc_id: Option<&str>,
        fut: F,
    ) -> FirestoreResult<T>
    where
        F: std::future::Future<Output = FirestoreResult<T>>,
    {
        let span = if let Some(id) = doc_id {
            info_span!(
                "firestore_request",
                operation = %operation,
                collection = %collection,
                doc_id = %id
            )
        } else {
            info_span!("firestore_request", operation = %operation, collection = %collection)
        };

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, collection, status, latency_ms);

        result
    }

    async fn handle_error_response(
        status: StatusCode,
        url: &str,
        response: Response,
    ) -> FirestoreError {
        let retry_after_ms = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs.saturating_mul(1000));
        let body = response.text().await.unwrap_or_default();

        match (status, retry_after_ms) {
            (StatusCode::TOO_MANY_REQUESTS, Some(ms)) => FirestoreError::RateLimited(ms),
            _ => FirestoreError::from_http_status(
                status.as_u16(),
                format!("{} failed: {}", url, body),
            ),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
