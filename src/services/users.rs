//! Administrative user management over `/users/*`.
//!
//! Pure pass-through: envelopes come back exactly as the backend sent them.
//! The only logic here is turning `UsersFilters` into query parameters.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::dashboard::{ExportFormat, ExportLink};
use super::token_enum;
use crate::net::client::ApiClient;
use crate::net::error::ApiError;
use crate::net::types::{ApiResponse, PaginatedResponse};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Moderator,
}

token_enum!(Role, "role", { Admin => "admin", User => "user", Moderator => "moderator" });

/// Account record managed by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

/// Partial update; `None` fields are left out of the request body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Email,
    CreatedAt,
    LastLogin,
}

token_enum!(SortBy, "sort field", {
    Name => "name",
    Email => "email",
    CreatedAt => "createdAt",
    LastLogin => "lastLogin",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

token_enum!(SortOrder, "sort order", { Asc => "asc", Desc => "desc" });

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsersFilters {
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

impl UsersFilters {
    /// Query parameters for the present filters, in a stable order.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(role) = self.role {
            params.push(("role", role.to_string()));
        }
        if let Some(active) = self.is_active {
            params.push(("isActive", active.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(sort_by) = self.sort_by {
            params.push(("sortBy", sort_by.to_string()));
        }
        if let Some(order) = self.sort_order {
            params.push(("sortOrder", order.to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
    Delete,
}

token_enum!(BulkAction, "bulk action", { Activate => "activate", Deactivate => "deactivate", Delete => "delete" });

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResult {
    pub processed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryPassword {
    pub temporary_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub by_role: BTreeMap<Role, u64>,
    pub recent_signups: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BulkRequest<'a> {
    action: &'static str,
    user_ids: &'a [String],
}

// =============================================================================
// SERVICE
// =============================================================================

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone)]
pub struct UserService {
    api: Arc<ApiClient>,
}

impl UserService {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// One page of users; `page` and `limit` always precede the filters.
    ///
    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_users(
        &self,
        page: u32,
        limit: u32,
        filters: &UsersFilters,
    ) -> Result<PaginatedResponse<ManagedUser>, ApiError> {
        let mut params = vec![("page", page.to_string()), ("limit", limit.to_string())];
        params.extend(filters.to_params());
        self.api.get_paginated("/users", &params).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_user_by_id(&self, id: &str) -> Result<ApiResponse<ManagedUser>, ApiError> {
        self.api.get(&format!("/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn create_user(&self, request: &CreateUserRequest) -> Result<ApiResponse<ManagedUser>, ApiError> {
        self.api.post("/users", request).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn update_user(
        &self,
        id: &str,
        request: &UpdateUserRequest,
    ) -> Result<ApiResponse<ManagedUser>, ApiError> {
        self.api.put(&format!("/users/{id}"), request).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn delete_user(&self, id: &str) -> Result<ApiResponse<DeleteAck>, ApiError> {
        self.api.delete(&format!("/users/{id}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn toggle_user_status(&self, id: &str) -> Result<ApiResponse<ManagedUser>, ApiError> {
        self.api.put_empty(&format!("/users/{id}/toggle-status")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn reset_user_password(&self, id: &str) -> Result<ApiResponse<TemporaryPassword>, ApiError> {
        self.api.post_empty(&format!("/users/{id}/reset-password")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn get_user_stats(&self) -> Result<ApiResponse<UserStats>, ApiError> {
        self.api.get("/users/stats").await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn export_users(&self, format: ExportFormat) -> Result<ApiResponse<ExportLink>, ApiError> {
        self.api.get(&format!("/users/export?format={format}")).await
    }

    /// # Errors
    ///
    /// Returns the transport error unchanged.
    pub async fn bulk_action(&self, action: BulkAction, ids: &[String]) -> Result<ApiResponse<BulkResult>, ApiError> {
        tracing::info!(action = action.as_str(), count = ids.len(), "bulk user action");
        self.api.post("/users/bulk-action", &BulkRequest { action: action.as_str(), user_ids: ids }).await
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
