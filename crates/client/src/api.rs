//! HTTP client for the student-records backend.
//!
//! Wraps the backend's REST endpoints (add, search, list, update, delete,
//! login) using [`reqwest`]. Every request carries a fresh `x-request-id`
//! and, once a session is attached, a bearer token.

use std::time::Duration;

use async_trait::async_trait;
use cadmin_core::student::{LookupRequest, SavedRecord, StudentRecord, UpdatePayload};
use reqwest::{Method, RequestBuilder, Url};

use crate::backend::StudentBackend;
use crate::error::BackendError;
use crate::session::{LoginRequest, LoginResponse, Session};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for one backend deployment.
#[derive(Debug, Clone)]
pub struct BackendApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl BackendApi {
    /// Create a client for the backend at `base_url`
    /// (e.g. `http://localhost:5000/`).
    ///
    /// * `timeout` - per-request timeout; `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, parse_base_url(base_url)?))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Attach the session's token to every subsequent request.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = session.token.clone();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Authenticate an admin.
    ///
    /// Sends `POST /api/login`. A `success: false` answer becomes
    /// [`BackendError::Unauthorized`] carrying the backend's message, if any.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session, BackendError> {
        credentials.check()?;

        let response = self
            .request(Method::POST, "api/login")?
            .json(credentials)
            .send()
            .await?;
        let body: LoginResponse = Self::parse_response(response).await?;

        if !body.success {
            let message = body.message.filter(|m| !m.trim().is_empty());
            tracing::warn!(email = %credentials.email, "Login refused");
            return Err(BackendError::Unauthorized(message));
        }

        tracing::info!(email = %credentials.email, "Logged in");
        Ok(Session::new(credentials.email.clone(), body.token))
    }

    // ---- private helpers ----

    /// Build a request for `path` relative to the base URL, with the
    /// request-id and auth headers applied.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BackendError::InvalidRequest(format!("bad endpoint '{path}': {e}")))?;
        Ok(self.request_url(method, url))
    }

    fn request_url(&self, method: Method, url: Url) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(%method, %url, request_id = %request_id, "Backend request");

        let builder = self
            .client
            .request(method, url)
            .header(REQUEST_ID_HEADER, request_id);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Ensure the response has a success status code, classifying any
    /// failure into a [`BackendError`] variant.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::debug!(status = status.as_u16(), body = %body, "Backend returned error");
            return Err(BackendError::from_status(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let response = Self::ensure_success(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))
    }

    /// Success body as text, for endpoints that may or may not echo a record.
    async fn success_text(response: reqwest::Response) -> Result<String, BackendError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl StudentBackend for BackendApi {
    /// Sends `POST /api/addstudent`. When the backend echoes the created
    /// document it becomes the saved copy; a bare acknowledgement keeps the
    /// submitted record.
    async fn create_student(&self, record: &StudentRecord) -> Result<SavedRecord, BackendError> {
        let response = self
            .request(Method::POST, "api/addstudent")?
            .json(record)
            .send()
            .await?;
        let text = Self::success_text(response).await?;

        let saved = echoed_record(&text).unwrap_or_else(|| record.clone());
        tracing::info!(roll_no = %saved.roll_no, id = ?saved.id, "Student added");
        Ok(SavedRecord::acknowledged(saved))
    }

    async fn lookup_student(&self, request: &LookupRequest) -> Result<SavedRecord, BackendError> {
        let response = self
            .request(Method::POST, "api/searchStudent")?
            .json(request)
            .send()
            .await?;
        let record: StudentRecord = Self::parse_response(response).await?;
        Ok(SavedRecord::acknowledged(record))
    }

    async fn list_students(&self) -> Result<Vec<StudentRecord>, BackendError> {
        let response = self
            .request(Method::GET, "api/getAllStudents")?
            .send()
            .await?;
        let rows: Option<Vec<serde_json::Value>> = Self::parse_response(response).await?;
        let rows = rows.unwrap_or_default();
        let total = rows.len();
        let records: Vec<StudentRecord> = rows.into_iter().filter_map(decode_listed).collect();
        tracing::debug!(count = records.len(), total, "Fetched all students");
        Ok(records)
    }

    async fn update_student(&self, update: &UpdatePayload) -> Result<(), BackendError> {
        let response = self
            .request(Method::PUT, "api/updatestudent")?
            .json(update)
            .send()
            .await?;
        Self::success_text(response).await?;
        tracing::info!(roll_no = %update.roll_no, "Student updated");
        Ok(())
    }

    async fn delete_student(&self, id: &str) -> Result<(), BackendError> {
        if id.trim().is_empty() {
            return Err(BackendError::InvalidRequest(
                "record id must not be empty".to_string(),
            ));
        }
        let mut url = self
            .base_url
            .join("api/deletestudent/")
            .map_err(|e| BackendError::InvalidRequest(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidRequest("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(id);

        let response = self.request_url(Method::DELETE, url).send().await?;
        Self::success_text(response).await?;
        tracing::info!(id, "Student deleted");
        Ok(())
    }
}

/// Parse and normalize the base URL so relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, BackendError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| BackendError::InvalidRequest(format!("invalid backend URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(BackendError::InvalidRequest(format!(
            "backend URL '{raw}' cannot be used as a base"
        )));
    }
    Ok(url)
}

/// Decode one listed row. Rows stored under older field rules are skipped
/// rather than failing the whole listing.
fn decode_listed(row: serde_json::Value) -> Option<StudentRecord> {
    let id = row.get("_id").cloned();
    match serde_json::from_value(row) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(id = ?id, error = %e, "Skipping undecodable student record");
            None
        }
    }
}

/// A record echoed in a success body, either bare or under `student`.
fn echoed_record(text: &str) -> Option<StudentRecord> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let candidate = value.get("student").cloned().unwrap_or(value);
    serde_json::from_value(candidate).ok()
}
