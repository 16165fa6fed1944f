//! The backend access seam.
//!
//! Workflows and directory services are written against
//! [`StudentBackend`] so they can run against the real HTTP client or an
//! in-memory stand-in.

use async_trait::async_trait;
use cadmin_core::student::{LookupRequest, SavedRecord, StudentRecord, UpdatePayload};

use crate::error::BackendError;

/// Record operations offered by the external backend.
#[async_trait]
pub trait StudentBackend: Send + Sync {
    /// `POST /api/addstudent`. Returns the acknowledged record.
    async fn create_student(&self, record: &StudentRecord) -> Result<SavedRecord, BackendError>;

    /// `POST /api/searchStudent`. [`BackendError::NotFound`] when absent.
    async fn lookup_student(&self, request: &LookupRequest) -> Result<SavedRecord, BackendError>;

    /// `GET /api/getAllStudents`.
    async fn list_students(&self) -> Result<Vec<StudentRecord>, BackendError>;

    /// `PUT /api/updatestudent`.
    async fn update_student(&self, update: &UpdatePayload) -> Result<(), BackendError>;

    /// `DELETE /api/deletestudent/:id`.
    async fn delete_student(&self, id: &str) -> Result<(), BackendError>;
}
