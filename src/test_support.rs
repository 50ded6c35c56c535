//! Shared fixtures: a loopback stub backend and canned records.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::Router;
use serde_json::{Value, json};

use crate::net::client::ApiClient;
use crate::net::types::User;
use crate::storage::session_store::SessionStore;

pub(crate) fn sample_user(id: &str) -> User {
    User {
        id: id.to_owned(),
        name: format!("User {id}"),
        email: format!("{id}@example.test"),
        role: "admin".to_owned(),
        avatar: None,
        created_at: "2024-01-01T00:00:00Z".to_owned(),
        updated_at: "2024-01-02T00:00:00Z".to_owned(),
    }
}

/// Successful envelope around `data`.
pub(crate) fn ok_envelope(data: Value) -> Json<Value> {
    Json(json!({ "data": data, "message": "ok", "success": true }))
}

/// Serve `router` on an ephemeral loopback port; returns the `/api` base URL.
pub(crate) async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL on a port nothing listens on, so connections are refused.
pub(crate) async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub(crate) fn test_client(base_url: &str, store: SessionStore) -> Arc<ApiClient> {
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    Arc::new(ApiClient::with_http(http, base_url, store))
}
