//! Add-student submission and the quick edit that follows it.

use std::sync::Arc;

use cadmin_client::backend::StudentBackend;
use cadmin_core::catalog::CourseCatalog;
use cadmin_core::form::{EditDraft, RecordForm};
use cadmin_core::qr::QrArtifact;
use cadmin_core::student::SavedRecord;

use crate::error::ConsoleError;

/// Shown when an add fails and the backend gave no reason.
pub const ADD_FAILED: &str = "Failed to add student. Try again!";

/// Shown when the post-submit edit fails.
pub const UPDATE_FAILED: &str = "Failed to update student. Try again.";

/// Outcome of a successful submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: SavedRecord,
    pub qr: QrArtifact,
}

/// Validates a [`RecordForm`], sends it and derives the QR link from the
/// saved record.
#[derive(Clone)]
pub struct SubmissionWorkflow {
    backend: Arc<dyn StudentBackend>,
    public_site: String,
}

impl SubmissionWorkflow {
    pub fn new(backend: Arc<dyn StudentBackend>, public_site: impl Into<String>) -> Self {
        Self {
            backend,
            public_site: public_site.into(),
        }
    }

    /// Submit the draft.
    ///
    /// A draft that fails validation never reaches the backend. On success
    /// the form is reset; on failure it is left as it was so the admin can
    /// resubmit.
    pub async fn submit(&self, form: &mut RecordForm) -> Result<Submission, ConsoleError> {
        let draft = form.validate()?;
        let record = draft.into_record();

        match self.backend.create_student(&record).await {
            Ok(saved) => {
                form.reset();
                let qr = QrArtifact::for_record(&saved, &self.public_site);
                tracing::info!(roll_no = %saved.roll_no, link = %qr.link(), "Submission accepted");
                Ok(Submission { record: saved, qr })
            }
            Err(e) => {
                tracing::warn!(roll_no = %record.roll_no, error = %e, "Submission failed");
                let message = e.backend_message().unwrap_or(ADD_FAILED).to_string();
                Err(ConsoleError::Action {
                    message,
                    source: Some(e),
                })
            }
        }
    }
}

/// Applies a quick name/course/duration edit to a just-saved record.
#[derive(Clone)]
pub struct UpdateWorkflow {
    backend: Arc<dyn StudentBackend>,
    catalog: Arc<CourseCatalog>,
}

impl UpdateWorkflow {
    pub fn new(backend: Arc<dyn StudentBackend>, catalog: Arc<CourseCatalog>) -> Self {
        Self { backend, catalog }
    }

    /// Send the edit and return the saved record with it merged in.
    ///
    /// Roll number and date of birth are kept from `saved`; the module set
    /// becomes the catalog list of the chosen course.
    pub async fn update_saved(
        &self,
        saved: &SavedRecord,
        draft: EditDraft,
    ) -> Result<SavedRecord, ConsoleError> {
        let update = draft.into_update(&self.catalog, saved)?;

        if let Err(e) = self.backend.update_student(&update).await {
            tracing::warn!(roll_no = %update.roll_no, error = %e, "Update failed");
            return Err(ConsoleError::action(UPDATE_FAILED, e));
        }
        Ok(saved.clone().merged(&update))
    }
}
