//! Transport error taxonomy.
//!
//! Fallback eligibility is decided by matching on the variant
//! (`ApiError::is_connectivity`), never by inspecting message text.

/// Errors produced by [`crate::net::client::ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend could not be reached at all (refused, DNS, timeout).
    #[error("cannot reach the API at {url}; is the backend running? ({message})")]
    Connectivity { url: String, message: String },

    /// HTTP 401. The stored token has already been cleared.
    #[error("unauthorized: token invalid or expired")]
    Unauthorized,

    /// HTTP 404.
    #[error("endpoint not found: {endpoint}")]
    NotFound { endpoint: String },

    /// HTTP 5xx.
    #[error("internal server error ({status})")]
    Server { status: u16 },

    /// Any other non-2xx status.
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// A 2xx response whose body is not a valid envelope.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The request body could not be serialized.
    #[error("request encode failed: {0}")]
    Encode(String),

    /// The request could not be built (bad URL, bad header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// True when the failure happened before any HTTP status was received.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Server { status } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Map a non-success status to its error class. Returns `None` for 2xx.
#[must_use]
pub fn classify_status(status: u16, reason: &str, endpoint: &str) -> Option<ApiError> {
    match status {
        200..=299 => None,
        401 => Some(ApiError::Unauthorized),
        404 => Some(ApiError::NotFound { endpoint: endpoint.to_owned() }),
        500..=u16::MAX => Some(ApiError::Server { status }),
        _ => Some(ApiError::Http { status, reason: reason.to_owned() }),
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
