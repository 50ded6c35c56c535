//! Persisted session record.
//!
//! DESIGN
//! ======
//! Sole owner of the three keys that together describe a session across
//! restarts. The transport client writes the token through here and the
//! session provider writes the flag and user through here, so multi-key
//! updates always go out as one batch.
//!
//! Intended invariant: a valid `auth_token` implies `isAuthenticated` implies
//! a `user` record. Clearing the token alone never breaks it.

use std::sync::Arc;

use super::{KeyValueStore, MemoryStore, StorageError, StorageOp};
use crate::net::types::User;

pub const IS_AUTHENTICATED_KEY: &str = "isAuthenticated";
pub const USER_KEY: &str = "user";
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Snapshot of the persisted session keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSession {
    pub is_authenticated: bool,
    pub user: Option<User>,
    pub token: Option<String>,
}

impl PersistedSession {
    /// The flag and the user record are both present.
    #[must_use]
    pub fn claims_login(&self) -> bool {
        self.is_authenticated && self.user.is_some()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Session store over a fresh in-memory backend.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read all three keys.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. A user record that is
    /// not valid JSON loads as absent.
    pub fn load(&self) -> Result<PersistedSession, StorageError> {
        let is_authenticated = self.inner.get(IS_AUTHENTICATED_KEY)?.as_deref() == Some("true");
        let user = match self.inner.get(USER_KEY)? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "persisted user record is unreadable; ignoring");
                    None
                }
            },
            None => None,
        };
        let token = self.inner.get(AUTH_TOKEN_KEY)?;
        Ok(PersistedSession { is_authenticated, user, token })
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        self.inner.get(AUTH_TOKEN_KEY)
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn save_token(&self, token: &str) -> Result<(), StorageError> {
        self.inner.set(AUTH_TOKEN_KEY, token)
    }

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.inner.remove(AUTH_TOKEN_KEY)
    }

    /// Persist the flag, the user record and, when given, the token together.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cannot be serialized or the batch fails.
    pub fn save_session(&self, user: &User, token: Option<&str>) -> Result<(), StorageError> {
        let mut ops = vec![
            StorageOp::set(IS_AUTHENTICATED_KEY, "true"),
            StorageOp::set(USER_KEY, serde_json::to_string(user)?),
        ];
        if let Some(token) = token {
            ops.push(StorageOp::set(AUTH_TOKEN_KEY, token));
        }
        self.inner.apply(&ops)
    }

    /// Remove every session key in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch fails.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.inner.apply(&[
            StorageOp::remove(IS_AUTHENTICATED_KEY),
            StorageOp::remove(USER_KEY),
            StorageOp::remove(AUTH_TOKEN_KEY),
        ])
    }
}

#[cfg(test)]
#[path = "session_store_test.rs"]
mod tests;
