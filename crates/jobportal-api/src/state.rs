//! Application state.

use std::sync::Arc;

use jobportal_firestore::FirestoreStore;

use crate::auth::SessionKeys;
use crate::config::ApiConfig;
use crate::store::PortalStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn PortalStore>,
    pub sessions: Arc<SessionKeys>,
}

impl AppState {
    /// Connect to Firestore and build the state. Called once before the listener binds.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = FirestoreStore::from_env().await?;
        Ok(Self::with_store(config, Arc::new(store)))
    }

    /// State over an already constructed store.
    pub fn with_store(config: ApiConfig, store: Arc<dyn PortalStore>) -> Self {
        let sessions = SessionKeys::new(&config.jwt_secret, config.session_ttl);
        Self {
            config,
            store,
            sessions: Arc::new(sessions),
        }
    }
}
