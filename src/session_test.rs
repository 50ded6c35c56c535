use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::json;

use super::*;
use crate::services::mock::{MOCK_EMAIL, MOCK_PASSWORD, MOCK_TOKEN};
use crate::storage::session_store::{AUTH_TOKEN_KEY, IS_AUTHENTICATED_KEY, USER_KEY};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::test_support::{ok_envelope, sample_user, spawn_stub, test_client, unreachable_base_url};

struct Harness {
    provider: SessionProvider,
    raw: Arc<MemoryStore>,
}

fn harness_with(base_url: &str, raw: Arc<MemoryStore>) -> Harness {
    let store = SessionStore::new(raw.clone());
    let auth = AuthService::new(test_client(base_url, store), false);
    Harness { provider: SessionProvider::new(auth), raw }
}

async fn offline() -> Harness {
    harness_with(&unreachable_base_url().await, Arc::new(MemoryStore::new()))
}

fn assert_keys_empty(raw: &MemoryStore) {
    for key in [IS_AUTHENTICATED_KEY, USER_KEY, AUTH_TOKEN_KEY] {
        assert_eq!(raw.get(key).unwrap(), None, "{key} should be cleared");
    }
}

// =============================================================================
// initial state
// =============================================================================

#[tokio::test]
async fn fresh_provider_is_loading_until_initialized() {
    let h = offline().await;
    let session = h.provider.snapshot();
    assert!(session.loading);
    assert!(!session.requires_login());

    h.provider.initialize().await;
    let session = h.provider.snapshot();
    assert!(!session.loading);
    assert!(!session.is_authenticated);
    assert!(session.requires_login());
}

// =============================================================================
// login
// =============================================================================

#[tokio::test]
async fn offline_login_with_fixed_pair_authenticates() {
    let h = offline().await;
    let mut toasts = h.provider.toasts();

    assert!(h.provider.login(MOCK_EMAIL, MOCK_PASSWORD).await);

    let session = h.provider.snapshot();
    assert!(session.is_authenticated);
    assert!(!session.loading);
    assert_eq!(session.error, None);
    assert_eq!(session.user.as_ref(), Some(h.provider.auth().mock().user()));
    assert_eq!(h.raw.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some(MOCK_TOKEN));
    assert_eq!(h.raw.get(IS_AUTHENTICATED_KEY).unwrap().as_deref(), Some("true"));

    let toast = toasts.recv().await.unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
}

#[tokio::test]
async fn offline_login_with_other_pair_fails_with_error() {
    let h = offline().await;
    h.provider.initialize().await;
    let mut toasts = h.provider.toasts();

    assert!(!h.provider.login("x@y.com", "wrong").await);

    let session = h.provider.snapshot();
    assert!(!session.is_authenticated);
    assert!(!session.loading);
    assert_eq!(session.error.as_deref(), Some("invalid credentials"));
    assert_keys_empty(&h.raw);
    assert_eq!(toasts.recv().await.unwrap().kind, ToastKind::Error);
}

#[tokio::test]
async fn login_is_observable_through_subscription() {
    let h = offline().await;
    let mut rx = h.provider.subscribe();
    rx.mark_unchanged();

    assert!(h.provider.login(MOCK_EMAIL, MOCK_PASSWORD).await);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_authenticated);
}

#[tokio::test]
async fn login_refused_while_another_operation_is_in_flight() {
    let h = offline().await;
    let held = h.provider.guard.lock().await;

    assert!(!h.provider.login(MOCK_EMAIL, MOCK_PASSWORD).await);
    assert_eq!(h.provider.snapshot().error.as_deref(), Some(BUSY_MESSAGE));
    drop(held);

    assert!(h.provider.login(MOCK_EMAIL, MOCK_PASSWORD).await);
}

// =============================================================================
// register
// =============================================================================

#[tokio::test]
async fn register_mismatch_reports_validation_without_request() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/auth/register",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::CREATED
            }
        }),
    );
    let h = harness_with(&spawn_stub(router).await, Arc::new(MemoryStore::new()));

    let data = RegisterData {
        name: "Ana".to_owned(),
        email: "ana@example.test".to_owned(),
        password: "one".to_owned(),
        confirm_password: "two".to_owned(),
    };
    assert!(!h.provider.register(&data).await);
    assert_eq!(h.provider.snapshot().error.as_deref(), Some("passwords do not match"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn offline_register_signs_new_account_in() {
    let h = offline().await;
    let data = RegisterData {
        name: "Ana".to_owned(),
        email: "ana@example.test".to_owned(),
        password: "pw".to_owned(),
        confirm_password: "pw".to_owned(),
    };

    assert!(h.provider.register(&data).await);
    let session = h.provider.snapshot();
    assert!(session.is_authenticated);
    assert_eq!(session.user.unwrap().email, "ana@example.test");
    assert!(h.raw.get(USER_KEY).unwrap().unwrap().contains("ana@example.test"));
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_clears_everything_even_when_backend_fails() {
    let router = Router::new()
        .route("/api/auth/login", post(|| async {
            ok_envelope(json!({ "user": serde_json::to_value(sample_user("5")).unwrap(), "token": "jwt-5" }))
        }))
        .route("/api/auth/logout", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let h = harness_with(&spawn_stub(router).await, Arc::new(MemoryStore::new()));
    assert!(h.provider.login("five@example.test", "pw").await);
    assert_eq!(h.raw.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("jwt-5"));

    h.provider.logout().await;
    let once = h.provider.snapshot();
    assert!(!once.is_authenticated);
    assert_eq!(once.user, None);
    assert_keys_empty(&h.raw);

    h.provider.logout().await;
    assert_eq!(h.provider.snapshot(), once);
    assert_keys_empty(&h.raw);
}

#[tokio::test]
async fn logout_announces_info_toast() {
    let h = offline().await;
    let mut toasts = h.provider.toasts();
    h.provider.logout().await;
    assert_eq!(toasts.recv().await.unwrap().kind, ToastKind::Info);
}

// =============================================================================
// initialize
// =============================================================================

#[tokio::test]
async fn offline_login_survives_restart() {
    let raw = Arc::new(MemoryStore::new());
    let base = unreachable_base_url().await;

    let first = harness_with(&base, raw.clone());
    assert!(first.provider.login(MOCK_EMAIL, MOCK_PASSWORD).await);
    let expected = first.provider.snapshot().user.unwrap();

    let second = harness_with(&base, raw);
    second.provider.initialize().await;
    let restored = second.provider.snapshot();
    assert!(restored.is_authenticated);
    assert_eq!(restored.user.map(|u| u.id), Some(expected.id));
}

#[tokio::test]
async fn initialize_adopts_backend_confirmed_user() {
    let router = Router::new().route(
        "/api/auth/me",
        get(|| async { ok_envelope(serde_json::to_value(sample_user("8")).unwrap()) }),
    );
    let raw = Arc::new(MemoryStore::new());
    SessionStore::new(raw.clone()).save_session(&sample_user("stale"), Some("jwt-8")).unwrap();
    let h = harness_with(&spawn_stub(router).await, raw);

    h.provider.initialize().await;
    assert_eq!(h.provider.snapshot().user, Some(sample_user("8")));
    assert!(h.raw.get(USER_KEY).unwrap().unwrap().contains("\"id\":\"8\""));
}

#[tokio::test]
async fn initialize_with_rejected_token_clears_persisted_session() {
    let router = Router::new().route("/api/auth/me", get(|| async { StatusCode::UNAUTHORIZED }));
    let raw = Arc::new(MemoryStore::new());
    SessionStore::new(raw.clone()).save_session(&sample_user("1"), Some("expired")).unwrap();
    let h = harness_with(&spawn_stub(router).await, raw);

    h.provider.initialize().await;
    let session = h.provider.snapshot();
    assert!(!session.is_authenticated);
    assert!(!session.loading);
    assert_keys_empty(&h.raw);
}

#[tokio::test]
async fn initialize_offline_with_foreign_token_clears_memory_and_storage() {
    let raw = Arc::new(MemoryStore::new());
    SessionStore::new(raw.clone()).save_session(&sample_user("1"), Some("stale-token")).unwrap();
    let h = harness_with(&unreachable_base_url().await, raw);
    assert_eq!(h.provider.auth().api().token().as_deref(), Some("stale-token"));

    h.provider.initialize().await;
    assert!(!h.provider.snapshot().is_authenticated);
    assert_eq!(h.provider.auth().api().token(), None);
    assert_keys_empty(&h.raw);
}

#[tokio::test]
async fn initialize_with_failed_envelope_clears_memory_and_storage() {
    let router = Router::new().route(
        "/api/auth/me",
        get(|| async { axum::Json(json!({ "data": null, "message": "session revoked", "success": false })) }),
    );
    let raw = Arc::new(MemoryStore::new());
    SessionStore::new(raw.clone()).save_session(&sample_user("1"), Some("revoked-token")).unwrap();
    let h = harness_with(&spawn_stub(router).await, raw);

    h.provider.initialize().await;
    assert!(!h.provider.snapshot().is_authenticated);
    assert_eq!(h.provider.auth().api().token(), None);
    assert_keys_empty(&h.raw);
}

#[tokio::test]
async fn offline_login_with_malformed_email_reports_invalid_credentials() {
    let h = offline().await;
    assert!(!h.provider.login("x", "wrong").await);
    assert_eq!(h.provider.snapshot().error.as_deref(), Some("invalid credentials"));
}

#[tokio::test]
async fn initialize_without_persisted_flag_skips_validation() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/auth/me",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ok_envelope(serde_json::to_value(sample_user("1")).unwrap())
            }
        }),
    );
    let raw = Arc::new(MemoryStore::new());
    raw.set(AUTH_TOKEN_KEY, "orphan-token").unwrap();
    let h = harness_with(&spawn_stub(router).await, raw);

    h.provider.initialize().await;
    assert!(!h.provider.snapshot().is_authenticated);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
