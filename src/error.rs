//! Client error types.

use thiserror::Error;

use crate::realtime::RealtimeError;

/// Errors surfaced by client operations.
///
/// Transport failures and non-2xx responses propagate to the caller as-is;
/// the client performs no retries or recovery.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization or deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the server.
        message: String,
    },

    /// Authentication failed (401).
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Realtime channel failure.
    #[error("Realtime error: {0}")]
    Realtime(#[from] RealtimeError),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this is a server-side error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the Poster API.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    pub message: String,
}
