//! Lookup of a single record by roll number and date of birth.

use std::sync::Arc;

use cadmin_client::backend::StudentBackend;
use cadmin_client::error::BackendError;
use cadmin_core::dob;
use cadmin_core::error::CoreError;
use cadmin_core::student::{LookupRequest, SavedRecord};

use crate::error::ConsoleError;

pub const NOT_FOUND: &str = "No student found with this Roll No and DOB.";
pub const FETCH_FAILED: &str = "Failed to fetch data. Check backend.";
pub const FILL_LOOKUP_FIELDS: &str = "Please enter both Roll No and DOB.";

/// Result of a lookup that reached the backend.
#[derive(Debug)]
pub enum LookupOutcome {
    Found(SavedRecord),
    NotFound,
    Failed(BackendError),
}

impl LookupOutcome {
    /// The message shown instead of a record.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            LookupOutcome::Found(_) => None,
            LookupOutcome::NotFound => Some(NOT_FOUND),
            LookupOutcome::Failed(_) => Some(FETCH_FAILED),
        }
    }

    /// The found record, or the outcome's message as an error.
    pub fn into_found(self) -> Result<SavedRecord, ConsoleError> {
        match self {
            LookupOutcome::Found(record) => Ok(record),
            LookupOutcome::NotFound => Err(ConsoleError::Action {
                message: NOT_FOUND.to_string(),
                source: None,
            }),
            LookupOutcome::Failed(e) => Err(ConsoleError::action(FETCH_FAILED, e)),
        }
    }
}

#[derive(Clone)]
pub struct SearchService {
    backend: Arc<dyn StudentBackend>,
}

impl SearchService {
    pub fn new(backend: Arc<dyn StudentBackend>) -> Self {
        Self { backend }
    }

    /// Look a student up. Blank or unparseable input is a validation error
    /// and makes no backend call.
    pub async fn lookup(
        &self,
        roll_no: &str,
        dob_text: &str,
    ) -> Result<LookupOutcome, ConsoleError> {
        let roll_no = roll_no.trim();
        if roll_no.is_empty() || dob_text.trim().is_empty() {
            return Err(CoreError::Validation(FILL_LOOKUP_FIELDS.to_string()).into());
        }
        let request = LookupRequest {
            roll_no: roll_no.to_string(),
            dob: dob::parse_dob(dob_text)?,
        };

        let outcome = match self.backend.lookup_student(&request).await {
            Ok(record) => LookupOutcome::Found(record),
            Err(e) if e.is_not_found() => LookupOutcome::NotFound,
            Err(e) => {
                tracing::warn!(roll_no, error = %e, "Lookup failed");
                LookupOutcome::Failed(e)
            }
        };
        Ok(outcome)
    }
}
