//! Observable authentication session.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionProvider` sits between the front end and `AuthService`. It turns
//! every auth outcome into a boolean plus an `error` string on the published
//! `Session`, persists the session through `SessionStore`, and announces
//! outcomes as `Toast`s.
//!
//! DESIGN
//! ======
//! State lives in a `watch` channel so any number of observers see the latest
//! value. Toasts use `broadcast`: they are events, not state, and a missing
//! listener just drops them.
//!
//! One async mutex serializes initialize/login/register/logout. Login and
//! register refuse to queue behind another operation; logout and initialize
//! wait, so a logout always lands after whatever was in flight.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error. Storage failures are logged; the in-memory
//! session stays authoritative for the life of the process.

use tokio::sync::{Mutex, broadcast, watch};

use crate::net::types::{AuthResponse, LoginCredentials, RegisterData, User};
use crate::services::auth::{AuthError, AuthService};
use crate::storage::session_store::SessionStore;

const TOAST_CAPACITY: usize = 16;
pub const BUSY_MESSAGE: &str = "another session operation is in progress";

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<User>,
    /// While true the other fields are not yet trustworthy.
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    fn starting() -> Self {
        Self { is_authenticated: false, user: None, loading: true, error: None }
    }

    fn signed_out() -> Self {
        Self { is_authenticated: false, user: None, loading: false, error: None }
    }

    fn signed_in(user: User) -> Self {
        Self { is_authenticated: true, user: Some(user), loading: false, error: None }
    }

    /// Protected-route check: settled and not authenticated.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        !self.loading && !self.is_authenticated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

impl Toast {
    fn new(kind: ToastKind, title: &str, message: impl Into<String>) -> Self {
        Self { kind, title: title.to_owned(), message: message.into() }
    }
}

// =============================================================================
// PROVIDER
// =============================================================================

pub struct SessionProvider {
    auth: AuthService,
    store: SessionStore,
    state: watch::Sender<Session>,
    toasts: broadcast::Sender<Toast>,
    guard: Mutex<()>,
}

impl SessionProvider {
    /// New provider in the `loading` state; call [`Self::initialize`] next.
    #[must_use]
    pub fn new(auth: AuthService) -> Self {
        let store = auth.api().store().clone();
        let (toasts, _) = broadcast::channel(TOAST_CAPACITY);
        Self { auth, store, state: watch::Sender::new(Session::starting()), toasts, guard: Mutex::new(()) }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn toasts(&self) -> broadcast::Receiver<Toast> {
        self.toasts.subscribe()
    }

    /// Restore a persisted session, trusting it only if the token still
    /// validates.
    pub async fn initialize(&self) {
        let _guard = self.guard.lock().await;
        self.state.send_modify(|s| s.loading = true);

        let persisted = match self.store.load() {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::error!(error = %e, "could not read persisted session");
                self.state.send_replace(Session::signed_out());
                return;
            }
        };

        if !persisted.claims_login() {
            tracing::debug!("no persisted session");
            self.state.send_replace(Session::signed_out());
            return;
        }

        match self.auth.validate_token().await {
            Some(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                if let Err(e) = self.store.save_session(&user, None) {
                    tracing::warn!(error = %e, "could not refresh persisted user");
                }
                self.state.send_replace(Session::signed_in(user));
            }
            None => {
                tracing::info!("persisted session no longer valid, clearing");
                if let Err(e) = self.auth.api().clear_session() {
                    tracing::warn!(error = %e, "could not clear persisted session");
                }
                self.state.send_replace(Session::signed_out());
            }
        }
    }

    /// Returns true when the session is now authenticated. Failures land in
    /// `Session::error` and an error toast.
    pub async fn login(&self, email: &str, password: &str) -> bool {
        let Ok(_guard) = self.guard.try_lock() else {
            return self.reject_busy();
        };
        self.begin();
        let result = self.auth.login(&LoginCredentials::new(email, password)).await;
        self.finish(result, "Login successful", "Login failed")
    }

    /// Create an account and sign it in, exactly like [`Self::login`].
    pub async fn register(&self, data: &RegisterData) -> bool {
        let Ok(_guard) = self.guard.try_lock() else {
            return self.reject_busy();
        };
        self.begin();
        let result = self.auth.register(data).await;
        self.finish(result, "Account created", "Sign-up failed")
    }

    /// Sign out locally no matter what the backend says.
    pub async fn logout(&self) {
        let _guard = self.guard.lock().await;
        self.auth.logout().await;
        if let Err(e) = self.auth.api().clear_session() {
            tracing::error!(error = %e, "could not clear persisted session on logout");
        }
        self.state.send_replace(Session::signed_out());
        tracing::info!("logged out");
        self.notify(Toast::new(ToastKind::Info, "Logged out", "You have been signed out"));
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn begin(&self) {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
    }

    fn finish(&self, result: Result<AuthResponse, AuthError>, ok_title: &str, err_title: &str) -> bool {
        match result {
            Ok(AuthResponse { user, token }) => {
                if let Err(e) = self.store.save_session(&user, Some(token.as_str())) {
                    tracing::error!(error = %e, "could not persist session");
                }
                let welcome = format!("Welcome, {}", user.name);
                self.state.send_replace(Session::signed_in(user));
                self.notify(Toast::new(ToastKind::Success, ok_title, welcome));
                true
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(error = %message, "session sign-in failed");
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(message.clone());
                });
                self.notify(Toast::new(ToastKind::Error, err_title, message));
                false
            }
        }
    }

    fn reject_busy(&self) -> bool {
        tracing::warn!("session operation rejected: {BUSY_MESSAGE}");
        self.state.send_modify(|s| s.error = Some(BUSY_MESSAGE.to_owned()));
        false
    }

    fn notify(&self, toast: Toast) {
        // No subscribers is fine.
        let _ = self.toasts.send(toast);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
