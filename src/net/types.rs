//! Wire types shared by the transport client and the services.
//!
//! Every backend response uses the `{ data, message, success }` envelope;
//! list endpoints add a `pagination` block. Field names are camelCase on the
//! wire.

use serde::{Deserialize, Serialize};

// =============================================================================
// ENVELOPES
// =============================================================================

/// Uniform response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Absent or `null` when the backend reports a failure.
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// The payload, when the backend reported success and sent one.
    pub fn into_success(self) -> Option<T> {
        if self.success { self.data } else { None }
    }

    /// The backend's message, or `default` when it sent none.
    #[must_use]
    pub fn message_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.message.is_empty() { default } else { &self.message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Envelope for list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
    pub pagination: Pagination,
}

// =============================================================================
// AUTH
// =============================================================================

/// Authenticated account as returned by `/auth/*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(email: &str, password: &str) -> Self {
        Self { email: email.to_owned(), password: password.to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
