//! Admin console client library.
//!
//! SYSTEM CONTEXT
//! ==============
//! The console talks to one REST backend through a single transport client.
//! Requests flow `SessionProvider -> AuthService -> ApiClient -> backend`, and
//! results flow back up into persisted storage and the observable `Session`.
//! When the backend cannot be reached, the auth service degrades to a fixed
//! fallback identity so the console stays usable offline.
//!
//! `ConsoleState` wires everything together; nothing here is a global.

pub mod config;
pub mod net;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::ConsoleConfig;
pub use net::client::ApiClient;
pub use net::error::ApiError;
pub use net::types::{ApiResponse, PaginatedResponse, Pagination, User};
pub use services::auth::{AuthError, AuthService};
pub use session::{Session, SessionProvider};
pub use state::ConsoleState;
pub use storage::session_store::SessionStore;
