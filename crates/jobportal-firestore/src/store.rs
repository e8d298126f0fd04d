//! Store facade bundling the collection repositories over one client.

use tracing::info;

use crate::applications_repo::ApplicationRepository;
use crate::client::FirestoreClient;
use crate::error::FirestoreResult;
use crate::jobs_repo::JobRepository;

/// Collection names used by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionNames {
    pub jobs: String,
    pub applicants: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            jobs: "jobs".to_string(),
            applicants: "applicants".to_string(),
        }
    }
}

impl CollectionNames {
    /// Read `JOBS_COLLECTION` and `APPLICANTS_COLLECTION`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jobs: non_empty_env("JOBS_COLLECTION").unwrap_or(defaults.jobs),
            applicants: non_empty_env("APPLICANTS_COLLECTION").unwrap_or(defaults.applicants),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Handle to both collections. Built once at startup and shared.
#[derive(Clone)]
pub struct FirestoreStore {
    client: FirestoreClient,
    pub jobs: JobRepository,
    pub applications: ApplicationRepository,
}

impl FirestoreStore {
    pub fn new(client: FirestoreClient, names: CollectionNames) -> Self {
        Self {
            jobs: JobRepository::new(client.clone(), names.jobs),
            applications: ApplicationRepository::new(client.clone(), names.applicants),
            client,
        }
    }

    /// Connect using environment configuration.
    pub async fn from_env() -> FirestoreResult<Self> {
        let client = FirestoreClient::from_env().await?;
        let names = CollectionNames::from_env();
        info!(
            "Firestore store ready (project={}, jobs={}, applicants={})",
            client.config().project_id,
            names.jobs,
            names.applicants
        );
        Ok(Self::new(client, names))
    }

    /// Round trip to the store, used by readiness checks.
    pub async fn ping(&self) -> FirestoreResult<()> {
        self.client.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_collection_names_from_env() {
        std::env::remove_var("JOBS_COLLECTION");
        std::env::set_var("APPLICANTS_COLLECTION", "applications_v2");
        let names = CollectionNames::from_env();
        assert_eq!(names.jobs, "jobs");
        assert_eq!(names.applicants, "applications_v2");
        std::env::remove_var("APPLICANTS_COLLECTION");
    }
}
