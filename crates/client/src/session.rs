//! Admin login session.
//!
//! A [`Session`] is created by a successful login and handed explicitly to
//! whatever needs it (the HTTP client attaches its token). [`SessionStore`]
//! keeps it between invocations in a small JSON file; logout deletes the
//! file.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cadmin_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::BackendError;

/// Credentials for `POST /api/login`.
#[derive(Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Check the credentials are well-formed before sending them.
    pub fn check(&self) -> Result<(), BackendError> {
        self.validate()
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))
    }
}

/// Body returned by `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// An authenticated admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    /// Opaque token issued by the backend, sent as a bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub logged_in_at: Timestamp,
}

impl Session {
    pub fn new(email: impl Into<String>, token: Option<String>) -> Self {
        Self {
            email: email.into(),
            token,
            logged_in_at: chrono::Utc::now(),
        }
    }
}

/// Errors reading or writing the session file.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// File-backed persistence for the current [`Session`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The stored session, or `None` when logged out.
    pub fn load(&self) -> Result<Option<Session>, SessionError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str(&text).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(session))
    }

    /// Persist `session`, replacing any previous one.
    pub fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session).expect("Session is always serialisable");
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), email = %session.email, "Session saved");
        Ok(())
    }

    /// Remove the stored session. Returns whether one existed.
    pub fn clear(&self) -> Result<bool, SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
