//! Client error taxonomy.

use thiserror::Error;

/// Errors surfaced by the session store, the backend client and controllers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ClientError {
    /// Login or signup rejected by the backend.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Client-side form check failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Connectivity failure or non-2xx response.
    #[error("network error: {0}")]
    Network(String),

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The credential is missing or was rejected on a protected call.
    #[error("not signed in or session expired")]
    Unauthenticated,

    /// The backend answered with a body that could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// Persisting or restoring the session failed.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
