//! REST transport client.
//!
//! Thin HTTP wrapper around one base URL. Injects the bearer token, maps
//! statuses to `ApiError` classes, and owns the persisted `auth_token` entry
//! (through `SessionStore`). Response bodies pass through unmodified.
//!
//! ERROR HANDLING
//! ==============
//! A 401 clears the token before the error is returned. Failures that never
//! produced a status become `ApiError::Connectivity`, which is what callers
//! key fallback behavior on. Parsing lives in pure functions for testability.

use std::sync::{PoisonError, RwLock};

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{ApiError, classify_status};
use super::types::{ApiResponse, PaginatedResponse};
use crate::config::ApiConfig;
use crate::storage::StorageError;
use crate::storage::session_store::SessionStore;

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
    store: SessionStore,
}

impl ApiClient {
    /// Build a client for `config.base_url`, picking up any persisted token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, store: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self::with_http(http, &config.base_url, store))
    }

    pub(crate) fn with_http(http: reqwest::Client, base_url: &str, store: SessionStore) -> Self {
        let token = store.token().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not read persisted token; starting without one");
            None
        });
        Self { http, base_url: base_url.trim_end_matches('/').to_owned(), token: RwLock::new(token), store }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Token attached to outgoing requests.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Use `token` for every subsequent request and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the token could not be persisted. The in-memory
    /// token is updated regardless.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
        self.store.save_token(token)
    }

    /// Forget the token in memory and in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted token could not be removed. The
    /// in-memory token is cleared regardless.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear_token()
    }

    /// Forget the token in memory and every persisted session key.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted keys could not be removed. The
    /// in-memory token is cleared regardless.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.clear_session()
    }

    // -------------------------------------------------------------------------
    // Verbs
    // -------------------------------------------------------------------------

    /// Perform a request and decode the envelope.
    ///
    /// # Errors
    ///
    /// Returns the classified transport, status or parse error.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<T>, ApiError> {
        let text = self.send(method, endpoint, &[], body).await?;
        parse_envelope(&text)
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, endpoint, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if `body` cannot be serialized.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::POST, endpoint, Some(encode_body(body)?)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::POST, endpoint, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`]; also fails if `body` cannot be serialized.
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::PUT, endpoint, Some(encode_body(body)?)).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::PUT, endpoint, None).await
    }

    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::DELETE, endpoint, None).await
    }

    /// GET a list endpoint with `params` appended as the query string.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`]; a body without a `pagination` block is a
    /// parse error.
    pub async fn get_paginated<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<PaginatedResponse<T>, ApiError> {
        let text = self.send(Method::GET, endpoint, params, None).await?;
        parse_paginated(&text)
    }

    // -------------------------------------------------------------------------
    // Transport
    // -------------------------------------------------------------------------

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<String, ApiError> {
        let url = format!("{}{endpoint}", self.base_url);
        tracing::debug!(%method, %url, "API request");

        let mut request = self.http.request(method.clone(), &url).header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| transport_error(&url, &e))?;
        let status = response.status();
        if let Some(err) = classify_status(status.as_u16(), status.canonical_reason().unwrap_or(""), endpoint) {
            if matches!(err, ApiError::Unauthorized) {
                if let Err(e) = self.clear_token() {
                    tracing::warn!(error = %e, "failed to clear persisted token after 401");
                }
            }
            tracing::warn!(%method, %url, status = status.as_u16(), error = %err, "API request failed");
            return Err(err);
        }

        response.text().await.map_err(|e| transport_error(&url, &e))
    }
}

fn transport_error(url: &str, e: &reqwest::Error) -> ApiError {
    if e.is_builder() {
        return ApiError::InvalidRequest(e.to_string());
    }
    tracing::error!(%url, error = %e, "API connection error; backend may not be running");
    ApiError::Connectivity { url: url.to_owned(), message: e.to_string() }
}

fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))
}

// =============================================================================
// PARSING
// =============================================================================

pub(crate) fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<ApiResponse<T>, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

pub(crate) fn parse_paginated<T: DeserializeOwned>(text: &str) -> Result<PaginatedResponse<T>, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
