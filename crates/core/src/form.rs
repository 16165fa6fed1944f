//! Record form controller.
//!
//! [`RecordForm`] owns the mutable draft of a new student record. Every
//! setter applies the catalog rules immediately, so the selected module set
//! is always a subset of the chosen course's modules. [`RecordForm::validate`]
//! is the only way to obtain a [`ValidatedDraft`] for submission.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::catalog::CourseCatalog;
use crate::dob;
use crate::duration::CourseDuration;
use crate::error::CoreError;
use crate::student::{StudentRecord, UpdatePayload};

/// Message shown when any required field of the add form is missing.
pub const FILL_ALL_FIELDS: &str = "Please fill all fields!";

/// Message shown when the post-submit edit panel is missing a field.
pub const FILL_EDIT_FIELDS: &str = "Please fill name, course, and duration.";

// ---------------------------------------------------------------------------
// Module selection
// ---------------------------------------------------------------------------

/// What happens to the module set when a course is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleSelectPolicy {
    /// Pre-check every module of the course.
    #[default]
    SelectAll,
    /// Start with nothing checked.
    ClearAll,
}

impl FromStr for ModuleSelectPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ModuleSelectPolicy::SelectAll),
            "none" => Ok(ModuleSelectPolicy::ClearAll),
            other => Err(CoreError::Validation(format!(
                "module selection policy must be 'all' or 'none', got '{other}'"
            ))),
        }
    }
}

/// A course choice plus the modules checked for it.
///
/// Shared by the add form and the directory's inline edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleSelection {
    course: String,
    modules: Vec<String>,
}

impl ModuleSelection {
    /// Start from an existing record's course and modules.
    ///
    /// Modules the catalog does not list for the course are dropped; an
    /// empty set falls back to the full catalog list.
    pub fn from_existing(catalog: &CourseCatalog, course: &str, modules: &[String]) -> Self {
        let mut kept = catalog.canonical_modules(course, modules);
        if kept.is_empty() {
            kept = catalog.modules(course).map(<[String]>::to_vec).unwrap_or_default();
        }
        Self {
            course: course.to_string(),
            modules: kept,
        }
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Pick a course (empty string clears it). Unknown courses are rejected
    /// and leave the selection unchanged.
    pub fn select_course(
        &mut self,
        catalog: &CourseCatalog,
        course: &str,
        policy: ModuleSelectPolicy,
    ) -> Result<(), CoreError> {
        let course = course.trim();
        if course.is_empty() {
            self.course.clear();
            self.modules.clear();
            return Ok(());
        }

        let Some(modules) = catalog.modules(course) else {
            return Err(CoreError::Validation(format!("Unknown course '{course}'")));
        };

        self.course = course.to_string();
        self.modules = match policy {
            ModuleSelectPolicy::SelectAll => modules.to_vec(),
            ModuleSelectPolicy::ClearAll => Vec::new(),
        };
        Ok(())
    }

    /// Check or uncheck one module of the current course.
    pub fn toggle(
        &mut self,
        catalog: &CourseCatalog,
        module: &str,
        checked: bool,
    ) -> Result<(), CoreError> {
        let Some(available) = catalog.modules(&self.course) else {
            return Err(CoreError::Validation(
                "Select a course before choosing modules".to_string(),
            ));
        };
        if !available.iter().any(|m| m == module) {
            return Err(CoreError::Validation(format!(
                "Module '{module}' is not part of '{}'",
                self.course
            )));
        }

        if checked {
            if !self.modules.iter().any(|m| m == module) {
                self.modules.push(module.to_string());
                self.modules = catalog.canonical_modules(&self.course, &self.modules);
            }
        } else {
            self.modules.retain(|m| m != module);
        }
        Ok(())
    }

    /// Replace the checked set wholesale, e.g. from command-line flags.
    pub fn set_modules(
        &mut self,
        catalog: &CourseCatalog,
        modules: &[String],
    ) -> Result<(), CoreError> {
        let previous = std::mem::take(&mut self.modules);
        for module in modules {
            if let Err(e) = self.toggle(catalog, module.trim(), true) {
                self.modules = previous;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Whether the checked set is a subset of the course's modules.
    pub fn is_consistent(&self, catalog: &CourseCatalog) -> bool {
        catalog.is_subset(&self.course, &self.modules)
    }
}

// ---------------------------------------------------------------------------
// Record form
// ---------------------------------------------------------------------------

/// Mutable draft of a new student record.
#[derive(Debug, Clone)]
pub struct RecordForm {
    catalog: Arc<CourseCatalog>,
    policy: ModuleSelectPolicy,
    roll_no: String,
    name: String,
    dob: Option<NaiveDate>,
    selection: ModuleSelection,
    duration: Option<CourseDuration>,
}

impl RecordForm {
    /// An empty draft bound to `catalog`.
    pub fn new(catalog: Arc<CourseCatalog>, policy: ModuleSelectPolicy) -> Self {
        Self {
            catalog,
            policy,
            roll_no: String::new(),
            name: String::new(),
            dob: None,
            selection: ModuleSelection::default(),
            duration: None,
        }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    pub fn set_roll_no(&mut self, roll_no: &str) {
        self.roll_no = roll_no.to_string();
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Set the date of birth from text. Empty text clears it; unparseable
    /// text clears it and reports why.
    pub fn set_dob(&mut self, text: &str) -> Result<(), CoreError> {
        if text.trim().is_empty() {
            self.dob = None;
            return Ok(());
        }
        match dob::parse_dob(text) {
            Ok(date) => {
                self.dob = Some(date);
                Ok(())
            }
            Err(e) => {
                self.dob = None;
                Err(e)
            }
        }
    }

    pub fn set_course(&mut self, course: &str) -> Result<(), CoreError> {
        self.selection.select_course(&self.catalog, course, self.policy)
    }

    pub fn toggle_module(&mut self, module: &str, checked: bool) -> Result<(), CoreError> {
        self.selection.toggle(&self.catalog, module, checked)
    }

    /// Replace the checked modules with exactly `modules`.
    pub fn set_modules(&mut self, modules: &[String]) -> Result<(), CoreError> {
        self.selection.set_modules(&self.catalog, modules)
    }

    pub fn set_duration(&mut self, duration: Option<CourseDuration>) {
        self.duration = duration;
    }

    /// The checklist for the current course: exactly its catalog modules.
    pub fn available_modules(&self) -> &[String] {
        self.catalog.modules(self.selection.course()).unwrap_or(&[])
    }

    pub fn selected_modules(&self) -> &[String] {
        self.selection.modules()
    }

    pub fn course(&self) -> &str {
        self.selection.course()
    }

    pub fn dob(&self) -> Option<NaiveDate> {
        self.dob
    }

    /// Check every required field and produce the record to submit.
    pub fn validate(&self) -> Result<ValidatedDraft, CoreError> {
        let roll_no = self.roll_no.trim();
        let name = self.name.trim();
        let course = self.selection.course();

        let (Some(dob), Some(duration)) = (self.dob, self.duration) else {
            return Err(CoreError::Validation(FILL_ALL_FIELDS.to_string()));
        };
        if roll_no.is_empty()
            || name.is_empty()
            || course.is_empty()
            || self.selection.modules().is_empty()
        {
            return Err(CoreError::Validation(FILL_ALL_FIELDS.to_string()));
        }
        if !self.selection.is_consistent(&self.catalog) {
            return Err(CoreError::Validation(format!(
                "Selected modules do not belong to '{course}'"
            )));
        }

        Ok(ValidatedDraft(StudentRecord {
            id: None,
            roll_no: roll_no.to_string(),
            name: name.to_string(),
            dob,
            course: course.to_string(),
            internship: self.selection.modules().to_vec(),
            duration,
        }))
    }

    /// Return the draft to its empty state.
    pub fn reset(&mut self) {
        self.roll_no.clear();
        self.name.clear();
        self.dob = None;
        self.selection = ModuleSelection::default();
        self.duration = None;
    }

    /// Whether every field is empty.
    pub fn is_empty(&self) -> bool {
        self.roll_no.is_empty()
            && self.name.is_empty()
            && self.dob.is_none()
            && self.selection.course().is_empty()
            && self.selection.modules().is_empty()
            && self.duration.is_none()
    }
}

/// A draft that passed [`RecordForm::validate`]; the only input the
/// submission workflow accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft(StudentRecord);

impl ValidatedDraft {
    pub fn record(&self) -> &StudentRecord {
        &self.0
    }

    pub fn into_record(self) -> StudentRecord {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Post-submit edit panel
// ---------------------------------------------------------------------------

/// Quick edit of a just-saved record: name, course and duration only.
///
/// The module set is not edited here; it is re-read from the catalog for
/// whichever course is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditDraft {
    pub name: String,
    pub course: String,
    pub duration: Option<CourseDuration>,
}

impl EditDraft {
    /// Pre-fill from the saved record.
    pub fn from_record(record: &StudentRecord) -> Self {
        Self {
            name: record.name.clone(),
            course: record.course.clone(),
            duration: Some(record.duration),
        }
    }

    /// Build the update body, keeping the saved record's identity.
    pub fn into_update(
        self,
        catalog: &CourseCatalog,
        saved: &StudentRecord,
    ) -> Result<UpdatePayload, CoreError> {
        let name = self.name.trim();
        let course = self.course.trim();
        let Some(duration) = self.duration else {
            return Err(CoreError::Validation(FILL_EDIT_FIELDS.to_string()));
        };
        if name.is_empty() || course.is_empty() {
            return Err(CoreError::Validation(FILL_EDIT_FIELDS.to_string()));
        }
        let Some(modules) = catalog.modules(course) else {
            return Err(CoreError::Validation(format!("Unknown course '{course}'")));
        };

        Ok(UpdatePayload {
            roll_no: saved.roll_no.clone(),
            dob: saved.dob,
            name: name.to_string(),
            course: course.to_string(),
            duration,
            internship: modules.to_vec(),
        })
    }
}
