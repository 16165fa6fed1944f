//! Directory service: drives [`DirectoryView`] against the backend.

use std::io::{BufRead, Write};
use std::sync::Arc;

use cadmin_client::backend::StudentBackend;
use cadmin_core::catalog::CourseCatalog;
use cadmin_core::directory::{DirectoryView, EditForm};
use cadmin_core::duration::CourseDuration;
use cadmin_core::error::CoreError;
use cadmin_core::form::ModuleSelectPolicy;
use cadmin_core::student::StudentRecord;

use crate::error::ConsoleError;

pub const LIST_FAILED: &str = "Failed to fetch students. Check backend.";
pub const SAVE_FAILED: &str = "Failed to update student. Try again.";
pub const DELETE_FAILED: &str = "Failed to delete student. Try again.";

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

/// Asks the admin to confirm a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool, ConsoleError>;
}

/// Confirms without asking (`--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> Result<bool, ConsoleError> {
        Ok(true)
    }
}

/// Prompts on a writer and reads a `y`/`yes` answer from a reader.
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptConfirm<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr, answer on stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> Result<bool, ConsoleError> {
        write!(self.output, "{prompt} [y/N] ")?;
        self.output.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }
}

// ---------------------------------------------------------------------------
// Edits
// ---------------------------------------------------------------------------

/// Field changes for an inline edit. `None` keeps the listed value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditChanges {
    pub name: Option<String>,
    pub course: Option<String>,
    pub modules: Option<Vec<String>>,
    pub duration: Option<CourseDuration>,
}

impl EditChanges {
    /// Apply to an open form. A course change resets the module set per
    /// policy before any explicit modules are applied.
    pub fn apply(&self, form: &mut EditForm) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            form.set_name(name);
        }
        if let Some(course) = &self.course {
            form.set_course(course)?;
        }
        if let Some(modules) = &self.modules {
            form.set_modules(modules)?;
        }
        if let Some(duration) = self.duration {
            form.set_duration(Some(duration));
        }
        Ok(())
    }
}

/// Outcome of [`DirectoryService::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(StudentRecord),
    Cancelled,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct DirectoryService {
    backend: Arc<dyn StudentBackend>,
    view: DirectoryView,
}

impl DirectoryService {
    pub fn new(
        backend: Arc<dyn StudentBackend>,
        catalog: Arc<CourseCatalog>,
        policy: ModuleSelectPolicy,
    ) -> Self {
        Self {
            backend,
            view: DirectoryView::new(catalog, policy),
        }
    }

    pub fn view(&self) -> &DirectoryView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut DirectoryView {
        &mut self.view
    }

    /// Reload the listing. A failed fetch leaves it empty.
    pub async fn refresh(&mut self) -> Result<usize, ConsoleError> {
        match self.backend.list_students().await {
            Ok(records) => {
                self.view.load(records);
                tracing::debug!(count = self.view.len(), "Directory refreshed");
                Ok(self.view.len())
            }
            Err(e) => {
                self.view.clear();
                tracing::warn!(error = %e, "Listing failed");
                Err(ConsoleError::action(LIST_FAILED, e))
            }
        }
    }

    /// Send the open edit form of `id`. On failure the record goes back
    /// to editing with the form intact.
    pub async fn save(&mut self, id: &str) -> Result<(), ConsoleError> {
        let update = self.view.begin_save(id)?;
        match self.backend.update_student(&update).await {
            Ok(()) => {
                self.view.complete_save(id, &update)?;
                tracing::info!(id, roll_no = %update.roll_no, "Record saved");
                Ok(())
            }
            Err(e) => {
                self.view.fail_save(id)?;
                tracing::warn!(id, error = %e, "Save failed");
                Err(ConsoleError::action(SAVE_FAILED, e))
            }
        }
    }

    /// Open the edit form of `id`, apply `changes` and save. Any failure
    /// closes the form and leaves the listed record unchanged.
    pub async fn edit(&mut self, id: &str, changes: &EditChanges) -> Result<(), ConsoleError> {
        let form = self.view.begin_edit(id)?;
        if let Err(e) = changes.apply(form) {
            self.view.cancel_edit(id)?;
            return Err(e.into());
        }
        if let Err(e) = self.save(id).await {
            self.view.cancel_edit(id)?;
            return Err(e);
        }
        Ok(())
    }

    /// Ask for confirmation, then delete `id`. Declining makes no backend
    /// call.
    pub async fn delete(
        &mut self,
        id: &str,
        confirm: &mut dyn Confirm,
    ) -> Result<DeleteOutcome, ConsoleError> {
        self.view.request_delete(id)?;
        let prompt = match self.view.get(id) {
            Some(record) => format!("Delete {} ({})?", record.name, record.roll_no),
            None => format!("Delete {id}?"),
        };

        let confirmed = match confirm.confirm(&prompt) {
            Ok(answer) => answer,
            Err(e) => {
                self.view.cancel_delete(id)?;
                return Err(e);
            }
        };
        if !confirmed {
            self.view.cancel_delete(id)?;
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.backend.delete_student(id).await {
            Ok(()) => {
                let record = self.view.complete_delete(id)?;
                tracing::info!(id, roll_no = %record.roll_no, "Record deleted");
                Ok(DeleteOutcome::Deleted(record))
            }
            Err(e) => {
                self.view.fail_delete(id)?;
                tracing::warn!(id, error = %e, "Delete failed");
                Err(ConsoleError::action(DELETE_FAILED, e))
            }
        }
    }
}
