//! Tagged outcome of a backend call.
//!
//! HTTP status codes and error payloads are classified once, here, so
//! callers match on variants instead of inspecting response shapes.

use serde::Deserialize;

/// Errors from the backend access layer.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 404.
    #[error("Record not found")]
    NotFound,

    /// The backend refused the payload (400/422) and said why.
    #[error("Rejected by backend: {0}")]
    Validation(String),

    /// Login refused, or the backend answered 401/403. Holds the backend's
    /// message only when it sent one.
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("access denied"))]
    Unauthorized(Option<String>),

    /// Any other non-2xx status.
    #[error("Backend returned HTTP {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// `error` / `message` field of the response body, if any.
        message: Option<String>,
    },

    /// A 2xx response whose body could not be read as the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// The request was invalid before it was sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// The human-readable message the backend put in its error payload.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            BackendError::Validation(msg) => Some(msg),
            BackendError::Unauthorized(message) | BackendError::Rejected { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound)
    }

    /// Classify a non-2xx response from its status and raw body.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = ErrorPayload::message_from(body);
        match status {
            404 => BackendError::NotFound,
            401 | 403 => BackendError::Unauthorized(message),
            400 | 422 => match message {
                Some(msg) => BackendError::Validation(msg),
                None => BackendError::Rejected { status, message: None },
            },
            _ => BackendError::Rejected { status, message },
        }
    }
}

/// Error body shapes the backend uses: `{ "error": "..." }` or
/// `{ "message": "..." }`.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorPayload {
    fn message_from(body: &str) -> Option<String> {
        let payload: ErrorPayload = serde_json::from_str(body).ok()?;
        payload
            .error
            .or(payload.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
