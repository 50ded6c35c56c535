//! Console composition root.
//!
//! DESIGN
//! ======
//! `ConsoleState` is built once by the front end and passed by reference to
//! every command. All services share one `ApiClient` (and therefore one token
//! and one `SessionStore`). Clone is cheap: every field is Arc-wrapped or a
//! thin handle.

use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::services::auth::AuthService;
use crate::services::dashboard::DashboardService;
use crate::services::users::UserService;
use crate::session::SessionProvider;
use crate::storage::FileStore;
use crate::storage::session_store::SessionStore;

#[derive(Clone)]
pub struct ConsoleState {
    pub config: ConsoleConfig,
    pub store: SessionStore,
    pub api: Arc<ApiClient>,
    pub auth: AuthService,
    pub session: Arc<SessionProvider>,
    pub dashboard: DashboardService,
    pub users: UserService,
}

impl ConsoleState {
    /// Wire the console against the file-backed store at `config.storage_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let store = SessionStore::new(Arc::new(FileStore::new(&config.storage_path)));
        Self::with_store(config, store)
    }

    /// Wire the console against an explicit store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_store(config: &ConsoleConfig, store: SessionStore) -> Result<Self, ApiError> {
        let api = Arc::new(ApiClient::new(&config.api, store.clone())?);
        Ok(Self::assemble(config.clone(), store, api))
    }

    pub(crate) fn assemble(config: ConsoleConfig, store: SessionStore, api: Arc<ApiClient>) -> Self {
        let auth = AuthService::new(api.clone(), config.use_mock_api);
        let session = Arc::new(SessionProvider::new(auth.clone()));
        tracing::debug!(base_url = %api.base_url(), mock = config.use_mock_api, "console state ready");
        Self {
            dashboard: DashboardService::new(api.clone()),
            users: UserService::new(api.clone()),
            config,
            store,
            api,
            auth,
            session,
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
