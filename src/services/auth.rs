//! Authentication flows with an offline fallback.
//!
//! DESIGN
//! ======
//! Every operation has a primary path (the backend answers) and a fallback
//! path served by `MockDirectory`. The fallback runs only when the transport
//! reports `ApiError::Connectivity`, or unconditionally when mock mode is
//! configured (then the backend is never contacted). Any HTTP status error is
//! surfaced as-is: a 401 or 500 never silently turns into a mock login.
//!
//! TRADE-OFFS
//! ==========
//! `validate_token` answers `Option<User>` instead of an error: callers only
//! need "is there a session", and a dead backend with a non-mock token simply
//! means "no".

use std::sync::Arc;

use super::mock::MockDirectory;
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{AuthResponse, LoginCredentials, RegisterData, User};
use crate::storage::StorageError;
use crate::validation::{self, ValidationError};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Offline fallback saw credentials other than the fixed pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Rejected locally before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend answered with `success: false`.
    #[error("{message}")]
    Rejected { message: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not persist token: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// SERVICE
// =============================================================================

#[derive(Clone)]
pub struct AuthService {
    api: Arc<ApiClient>,
    mock: Arc<MockDirectory>,
    force_mock: bool,
}

impl AuthService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>, force_mock: bool) -> Self {
        Self { api, mock: Arc::new(MockDirectory::new()), force_mock }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    #[must_use]
    pub fn mock(&self) -> &MockDirectory {
        &self.mock
    }

    #[must_use]
    pub fn is_mock_mode(&self) -> bool {
        self.force_mock
    }

    /// Log in and keep the returned token for later requests.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or malformed form (no request is sent)
    /// - `InvalidCredentials` when the fallback rejects the pair
    /// - `Rejected` / `Api` when the backend refuses or fails
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, AuthError> {
        validation::validate_login(credentials)?;

        if self.force_mock {
            return self.mock_login(credentials);
        }

        match self.api.post::<AuthResponse, _>("/auth/login", credentials).await {
            Ok(envelope) => {
                let message = envelope.message_or("login failed").to_owned();
                let auth = envelope.into_success().ok_or(AuthError::Rejected { message })?;
                self.api.set_token(&auth.token)?;
                tracing::info!(user_id = %auth.user.id, "login succeeded");
                Ok(auth)
            }
            Err(e) if e.is_connectivity() => {
                tracing::warn!(error = %e, "API login failed, using fallback");
                self.mock_login(credentials)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create an account and keep the returned token.
    ///
    /// # Errors
    ///
    /// - `Validation` for mismatched passwords or missing fields (no request is sent)
    /// - `Rejected` / `Api` when the backend refuses or fails
    pub async fn register(&self, data: &RegisterData) -> Result<AuthResponse, AuthError> {
        validation::validate_registration(data)?;

        if self.force_mock {
            return self.mock_register(data);
        }

        match self.api.post::<AuthResponse, _>("/auth/register", data).await {
            Ok(envelope) => {
                let message = envelope.message_or("registration failed").to_owned();
                let auth = envelope.into_success().ok_or(AuthError::Rejected { message })?;
                self.api.set_token(&auth.token)?;
                tracing::info!(user_id = %auth.user.id, "registration succeeded");
                Ok(auth)
            }
            Err(e) if e.is_connectivity() => {
                tracing::warn!(error = %e, "API register failed, using fallback");
                self.mock_register(data)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Ask the backend who the current token belongs to.
    ///
    /// Returns `None` for "not authenticated", including every failure that
    /// the fallback cannot resolve.
    pub async fn validate_token(&self) -> Option<User> {
        if self.force_mock {
            return self.mock_validate();
        }

        match self.api.get::<User>("/auth/me").await {
            Ok(envelope) => envelope.into_success(),
            Err(e) if e.is_connectivity() => {
                tracing::warn!(error = %e, "API token validation failed, using fallback");
                self.mock_validate()
            }
            Err(e) => {
                tracing::warn!(error = %e, "token validation rejected");
                None
            }
        }
    }

    /// Best-effort remote logout; the local token is cleared no matter what.
    pub async fn logout(&self) {
        if !self.force_mock {
            if let Err(e) = self.api.post_empty::<serde_json::Value>("/auth/logout").await {
                tracing::warn!(error = %e, "API logout failed, clearing local data");
            }
        }
        if let Err(e) = self.api.clear_token() {
            tracing::error!(error = %e, "failed to clear persisted token on logout");
        }
    }

    /// # Errors
    ///
    /// `Rejected` / `Api` when the backend refuses or fails for a reason other
    /// than connectivity.
    pub async fn get_user_profile(&self) -> Result<User, AuthError> {
        if self.force_mock {
            return Ok(self.mock.user().clone());
        }

        match self.api.get::<User>("/auth/profile").await {
            Ok(envelope) => {
                let message = envelope.message_or("failed to load profile").to_owned();
                envelope.into_success().ok_or(AuthError::Rejected { message })
            }
            Err(e) if e.is_connectivity() => {
                tracing::warn!(error = %e, "API profile failed, using fallback");
                Ok(self.mock.user().clone())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Password reset has no backend endpoint; the request is validated and
    /// acknowledged locally.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or malformed email.
    pub fn request_password_reset(&self, email: &str) -> Result<String, AuthError> {
        validation::validate_reset_request(email)?;
        tracing::info!(email = %email.trim(), "password reset requested");
        Ok(format!("Password reset link sent to {}", email.trim()))
    }

    // -------------------------------------------------------------------------
    // Fallback path
    // -------------------------------------------------------------------------

    fn mock_login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, AuthError> {
        let auth = self.mock.authenticate(credentials).ok_or(AuthError::InvalidCredentials)?;
        self.api.set_token(&auth.token)?;
        tracing::info!("fallback login granted");
        Ok(auth)
    }

    fn mock_register(&self, data: &RegisterData) -> Result<AuthResponse, AuthError> {
        let auth = self.mock.register(data);
        self.api.set_token(&auth.token)?;
        tracing::info!(user_id = %auth.user.id, "fallback registration granted");
        Ok(auth)
    }

    fn mock_validate(&self) -> Option<User> {
        let stored = match self.api.store().token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read persisted token");
                None
            }
        };
        stored
            .filter(|token| self.mock.recognizes_token(token))
            .map(|_| self.mock.user().clone())
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
