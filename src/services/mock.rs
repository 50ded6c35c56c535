//! Fallback identity used when the backend is unreachable or mock mode is on.
//!
//! Matching is exact: one credential pair, one token. Nothing else ever
//! authenticates offline.

use rand::Rng;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::net::types::{AuthResponse, LoginCredentials, RegisterData, User};

pub const MOCK_EMAIL: &str = "admin@exemplo.com";
pub const MOCK_PASSWORD: &str = "admin123";
pub const MOCK_TOKEN: &str = "mock_jwt_token_12345";

const MOCK_ID_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The fixed offline account, timestamped once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockDirectory {
    user: User,
}

impl MockDirectory {
    #[must_use]
    pub fn new() -> Self {
        let now = OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
        Self {
            user: User {
                id: "1".to_owned(),
                name: "Admin Usuário".to_owned(),
                email: MOCK_EMAIL.to_owned(),
                role: "admin".to_owned(),
                avatar: Some(String::new()),
                created_at: now.clone(),
                updated_at: now,
            },
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Grant the mock session only for the exact fixed credential pair.
    #[must_use]
    pub fn authenticate(&self, credentials: &LoginCredentials) -> Option<AuthResponse> {
        if credentials.email == MOCK_EMAIL && credentials.password == MOCK_PASSWORD {
            return Some(mock_response(self.user.clone()));
        }
        None
    }

    /// New account shaped like the mock profile, carrying the submitted name
    /// and email under a random id.
    #[must_use]
    pub fn register(&self, data: &RegisterData) -> AuthResponse {
        let user = User { id: random_id(), name: data.name.clone(), email: data.email.clone(), ..self.user.clone() };
        mock_response(user)
    }

    #[must_use]
    pub fn recognizes_token(&self, token: &str) -> bool {
        token == MOCK_TOKEN
    }
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn mock_response(user: User) -> AuthResponse {
    AuthResponse { user, token: MOCK_TOKEN.to_owned() }
}

fn random_id() -> String {
    let mut rng = rand::rng();
    (0..MOCK_ID_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect()
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
