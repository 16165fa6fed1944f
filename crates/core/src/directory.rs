//! Directory view: the listing / inline-edit / delete surface over
//! records fetched from the backend.
//!
//! Each listed record moves through its own small state machine:
//!
//! ```text
//! Viewing -> Editing -> Saving -> Viewing
//!                 ^        |
//!                 +--------+   (save failed)
//! Viewing -> Deleting -> Removed | Viewing
//! ```
//!
//! The view never talks to the backend itself. Callers ask it for the
//! payload to send (`begin_save`) and report the outcome back
//! (`complete_save` / `fail_save`, `complete_delete` / `fail_delete`).

use std::sync::Arc;

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::catalog::CourseCatalog;
use crate::duration::CourseDuration;
use crate::error::CoreError;
use crate::form::{ModuleSelectPolicy, ModuleSelection};
use crate::student::{StudentRecord, UpdatePayload};
use crate::types::RecordId;

/// Message shown when the inline edit form is missing a field.
pub const FILL_INLINE_FIELDS: &str = "Please fill name, course and duration.";

const ENTITY: &str = "Student";

// ---------------------------------------------------------------------------
// Edit form
// ---------------------------------------------------------------------------

/// Inline edit form for one listed record.
///
/// Follows the same catalog rules as the add form: picking a course resets
/// the modules per policy and toggles are bounded by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    catalog: Arc<CourseCatalog>,
    policy: ModuleSelectPolicy,
    name: String,
    selection: ModuleSelection,
    duration: Option<CourseDuration>,
    dob: NaiveDate,
}

impl EditForm {
    fn from_record(
        catalog: Arc<CourseCatalog>,
        policy: ModuleSelectPolicy,
        record: &StudentRecord,
    ) -> Self {
        let selection =
            ModuleSelection::from_existing(&catalog, &record.course, &record.internship);
        Self {
            catalog,
            policy,
            name: record.name.clone(),
            selection,
            duration: Some(record.duration),
            dob: record.dob,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn course(&self) -> &str {
        self.selection.course()
    }

    pub fn modules(&self) -> &[String] {
        self.selection.modules()
    }

    pub fn duration(&self) -> Option<CourseDuration> {
        self.duration
    }

    /// The checklist for the form's current course.
    pub fn available_modules(&self) -> &[String] {
        self.catalog.modules(self.selection.course()).unwrap_or(&[])
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_course(&mut self, course: &str) -> Result<(), CoreError> {
        self.selection.select_course(&self.catalog, course, self.policy)
    }

    pub fn toggle_module(&mut self, module: &str, checked: bool) -> Result<(), CoreError> {
        self.selection.toggle(&self.catalog, module, checked)
    }

    pub fn set_modules(&mut self, modules: &[String]) -> Result<(), CoreError> {
        self.selection.set_modules(&self.catalog, modules)
    }

    pub fn set_duration(&mut self, duration: Option<CourseDuration>) {
        self.duration = duration;
    }

    fn to_payload(&self, roll_no: &str) -> Result<UpdatePayload, CoreError> {
        let name = self.name.trim();
        let course = self.selection.course();
        let Some(duration) = self.duration else {
            return Err(CoreError::Validation(FILL_INLINE_FIELDS.to_string()));
        };
        if name.is_empty() || course.is_empty() {
            return Err(CoreError::Validation(FILL_INLINE_FIELDS.to_string()));
        }
        if self.selection.modules().is_empty() {
            return Err(CoreError::Validation(
                "Select at least one module.".to_string(),
            ));
        }
        if !self.selection.is_consistent(&self.catalog) {
            return Err(CoreError::Validation(format!(
                "Selected modules do not belong to '{course}'"
            )));
        }

        Ok(UpdatePayload {
            roll_no: roll_no.to_string(),
            dob: self.dob,
            name: name.to_string(),
            course: course.to_string(),
            duration,
            internship: self.selection.modules().to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Per-record state
// ---------------------------------------------------------------------------

/// Where one listed record is in its edit/delete lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    Viewing,
    Editing(EditForm),
    Saving(EditForm),
    /// Awaiting delete confirmation or the backend's answer.
    Deleting,
}

/// Field-less view of [`RecordState`] for display and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Viewing,
    Editing,
    Saving,
    Deleting,
}

impl RecordState {
    pub fn status(&self) -> RecordStatus {
        match self {
            RecordState::Viewing => RecordStatus::Viewing,
            RecordState::Editing(_) => RecordStatus::Editing,
            RecordState::Saving(_) => RecordStatus::Saving,
            RecordState::Deleting => RecordStatus::Deleting,
        }
    }
}

#[derive(Debug, Clone)]
struct ListedRecord {
    id: RecordId,
    record: StudentRecord,
    state: RecordState,
}

// ---------------------------------------------------------------------------
// Directory view
// ---------------------------------------------------------------------------

/// Local listing of records plus their per-record state.
#[derive(Debug, Clone)]
pub struct DirectoryView {
    catalog: Arc<CourseCatalog>,
    policy: ModuleSelectPolicy,
    entries: Vec<ListedRecord>,
}

impl DirectoryView {
    pub fn new(catalog: Arc<CourseCatalog>, policy: ModuleSelectPolicy) -> Self {
        Self {
            catalog,
            policy,
            entries: Vec::new(),
        }
    }

    /// Replace the listing with freshly fetched records.
    ///
    /// Records without a backend id cannot be edited or deleted and are
    /// skipped.
    pub fn load(&mut self, records: Vec<StudentRecord>) {
        let total = records.len();
        self.entries = records
            .into_iter()
            .filter_map(|record| match record.id.clone() {
                Some(id) => Some(ListedRecord {
                    id,
                    record,
                    state: RecordState::Viewing,
                }),
                None => {
                    tracing::warn!(roll_no = %record.roll_no, "Skipping listed record without id");
                    None
                }
            })
            .collect();
        tracing::debug!(total, kept = self.entries.len(), "Directory loaded");
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records in listing order.
    pub fn records(&self) -> impl Iterator<Item = &StudentRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    pub fn get(&self, id: &str) -> Option<&StudentRecord> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.record)
    }

    pub fn status(&self, id: &str) -> Option<RecordStatus> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.state.status())
    }

    /// Records grouped by course, courses in order of first appearance.
    pub fn grouped_by_course(&self) -> IndexMap<&str, Vec<&StudentRecord>> {
        let mut groups: IndexMap<&str, Vec<&StudentRecord>> = IndexMap::new();
        for entry in &self.entries {
            groups
                .entry(entry.record.course.as_str())
                .or_default()
                .push(&entry.record);
        }
        groups
    }

    // ---- edit ----

    /// `Viewing -> Editing`: open the inline form pre-filled from the record.
    pub fn begin_edit(&mut self, id: &str) -> Result<&mut EditForm, CoreError> {
        let catalog = Arc::clone(&self.catalog);
        let policy = self.policy;
        let entry = self.entry_mut(id)?;
        expect_status(entry, RecordStatus::Viewing, "edit")?;
        entry.state = RecordState::Editing(EditForm::from_record(catalog, policy, &entry.record));
        match &mut entry.state {
            RecordState::Editing(form) => Ok(form),
            other => Err(conflict(id, other.status(), "edit")),
        }
    }

    /// The open inline form of a record in `Editing`.
    pub fn edit_form_mut(&mut self, id: &str) -> Result<&mut EditForm, CoreError> {
        let entry = self.entry_mut(id)?;
        match &mut entry.state {
            RecordState::Editing(form) => Ok(form),
            other => Err(conflict(id, other.status(), "change the edit form")),
        }
    }

    /// `Editing -> Viewing`, discarding the form. The record is untouched.
    pub fn cancel_edit(&mut self, id: &str) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        expect_status(entry, RecordStatus::Editing, "cancel editing")?;
        entry.state = RecordState::Viewing;
        Ok(())
    }

    /// `Editing -> Saving`: validate the form and return the update body.
    /// On validation failure the record stays in `Editing`.
    pub fn begin_save(&mut self, id: &str) -> Result<UpdatePayload, CoreError> {
        let entry = self.entry_mut(id)?;
        let RecordState::Editing(form) = &entry.state else {
            return Err(conflict(id, entry.state.status(), "save"));
        };
        let payload = form.to_payload(&entry.record.roll_no)?;

        let state = std::mem::replace(&mut entry.state, RecordState::Viewing);
        if let RecordState::Editing(form) = state {
            entry.state = RecordState::Saving(form);
        }
        Ok(payload)
    }

    /// `Saving -> Viewing`: merge the acknowledged fields into the record.
    pub fn complete_save(&mut self, id: &str, update: &UpdatePayload) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        expect_status(entry, RecordStatus::Saving, "complete a save")?;
        entry.record.apply_update(update);
        entry.state = RecordState::Viewing;
        Ok(())
    }

    /// `Saving -> Editing`: the backend refused; keep the form for retry.
    pub fn fail_save(&mut self, id: &str) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        let state = std::mem::replace(&mut entry.state, RecordState::Viewing);
        match state {
            RecordState::Saving(form) => {
                entry.state = RecordState::Editing(form);
                Ok(())
            }
            other => {
                let status = other.status();
                entry.state = other;
                Err(conflict(id, status, "fail a save"))
            }
        }
    }

    // ---- delete ----

    /// `Viewing -> Deleting`: awaiting confirmation.
    pub fn request_delete(&mut self, id: &str) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        expect_status(entry, RecordStatus::Viewing, "delete")?;
        entry.state = RecordState::Deleting;
        Ok(())
    }

    /// `Deleting -> Viewing`: the admin declined.
    pub fn cancel_delete(&mut self, id: &str) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        expect_status(entry, RecordStatus::Deleting, "cancel deleting")?;
        entry.state = RecordState::Viewing;
        Ok(())
    }

    /// `Deleting -> Removed`: drop exactly this record from the listing.
    pub fn complete_delete(&mut self, id: &str) -> Result<StudentRecord, CoreError> {
        let index = self.index_of(id)?;
        expect_status(&self.entries[index], RecordStatus::Deleting, "complete a delete")?;
        Ok(self.entries.remove(index).record)
    }

    /// `Deleting -> Viewing`: the backend refused the delete.
    pub fn fail_delete(&mut self, id: &str) -> Result<(), CoreError> {
        let entry = self.entry_mut(id)?;
        expect_status(entry, RecordStatus::Deleting, "fail a delete")?;
        entry.state = RecordState::Viewing;
        Ok(())
    }

    // ---- private helpers ----

    fn index_of(&self, id: &str) -> Result<usize, CoreError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: ENTITY,
                id: id.to_string(),
            })
    }

    fn entry_mut(&mut self, id: &str) -> Result<&mut ListedRecord, CoreError> {
        let index = self.index_of(id)?;
        Ok(&mut self.entries[index])
    }
}

fn expect_status(
    entry: &ListedRecord,
    wanted: RecordStatus,
    action: &str,
) -> Result<(), CoreError> {
    let status = entry.state.status();
    if status != wanted {
        return Err(conflict(&entry.id, status, action));
    }
    Ok(())
}

fn conflict(id: &str, status: RecordStatus, action: &str) -> CoreError {
    CoreError::Conflict(format!("cannot {action} record {id} while {status:?}"))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const OFFICE: &str = "Certification in MS Office";
    const EXCEL: &str = "Certification in MS Excel";

    fn record(id: &str, roll: &str, course: &str, modules: &[&str]) -> StudentRecord {
        StudentRecord {
            id: Some(id.to_string()),
            roll_no: roll.to_string(),
            name: format!("Student {roll}"),
            dob: NaiveDate::from_ymd_opt(2000, 1, 15).unwrap(),
            course: course.to_string(),
            internship: modules.iter().map(|m| m.to_string()).collect(),
            duration: CourseDuration::Months(2),
        }
    }

    fn view() -> DirectoryView {
        let mut view = DirectoryView::new(
            Arc::new(CourseCatalog::embedded()),
            ModuleSelectPolicy::SelectAll,
        );
        view.load(vec![
            record("a", "R1", OFFICE, &["MS Word"]),
            record("b", "R2", EXCEL, &["MS Excel"]),
            record("c", "R3", OFFICE, &["MS Excel", "MS Powerpoint"]),
        ]);
        view
    }

    #[test]
    fn load_skips_records_without_id() {
        let mut v = view();
        let mut orphan = record("x", "R9", OFFICE, &[]);
        orphan.id = None;
        v.load(vec![orphan, record("d", "R4", EXCEL, &["MS Excel"])]);
        assert_eq!(v.len(), 1);
        assert!(v.get("d").is_some());
    }

    #[test]
    fn groups_by_course_in_first_appearance_order() {
        let v = view();
        let groups = v.grouped_by_course();
        let courses: Vec<&str> = groups.keys().copied().collect();
        assert_eq!(courses, [OFFICE, EXCEL]);
        let office: Vec<&str> = groups[OFFICE].iter().map(|r| r.roll_no.as_str()).collect();
        assert_eq!(office, ["R1", "R3"]);
    }

    #[test]
    fn cancel_edit_leaves_record_unchanged() {
        let mut v = view();
        let before = v.get("a").cloned().unwrap();

        let form = v.begin_edit("a").unwrap();
        form.set_name("Changed");
        form.set_course(EXCEL).unwrap();
        v.cancel_edit("a").unwrap();

        assert_eq!(v.get("a"), Some(&before));
        assert_eq!(v.status("a"), Some(RecordStatus::Viewing));
    }

    #[test]
    fn save_updates_exactly_submitted_fields() {
        let mut v = view();
        let others: Vec<StudentRecord> = ["b", "c"]
            .iter()
            .map(|id| v.get(id).cloned().unwrap())
            .collect();

        let form = v.begin_edit("a").unwrap();
        form.set_name("Asha K");
        form.toggle_module("MS Powerpoint", true).unwrap();
        form.set_duration(Some(CourseDuration::Days(15)));

        let payload = v.begin_save("a").unwrap();
        assert_eq!(v.status("a"), Some(RecordStatus::Saving));
        assert_eq!(payload.roll_no, "R1");
        assert_eq!(payload.internship, ["MS Word", "MS Powerpoint"]);

        v.complete_save("a", &payload).unwrap();
        let saved = v.get("a").unwrap();
        assert_eq!(saved.name, "Asha K");
        assert_eq!(saved.duration, CourseDuration::Days(15));
        assert_eq!(saved.internship, ["MS Word", "MS Powerpoint"]);
        assert_eq!(saved.roll_no, "R1");
        assert_eq!(saved.id.as_deref(), Some("a"));
        assert_eq!(v.status("a"), Some(RecordStatus::Viewing));

        assert_eq!(v.get("b"), Some(&others[0]));
        assert_eq!(v.get("c"), Some(&others[1]));
    }

    #[test]
    fn edit_form_starts_from_record_modules() {
        let mut v = view();
        let form = v.begin_edit("c").unwrap();
        assert_eq!(form.modules(), ["MS Excel", "MS Powerpoint"]);
        assert_eq!(form.available_modules().len(), 3);
    }

    #[test]
    fn course_change_in_edit_resets_modules() {
        let mut v = view();
        let form = v.begin_edit("a").unwrap();
        form.set_course(EXCEL).unwrap();
        assert_eq!(form.modules(), ["MS Excel"]);
        assert!(form.toggle_module("MS Word", true).is_err());
    }

    #[test]
    fn invalid_save_stays_editing() {
        let mut v = view();
        v.begin_edit("a").unwrap().set_name("  ");
        assert_matches!(
            v.begin_save("a"),
            Err(CoreError::Validation(msg)) if msg == FILL_INLINE_FIELDS
        );
        assert_eq!(v.status("a"), Some(RecordStatus::Editing));

        let form = v.edit_form_mut("a").unwrap();
        form.set_name("Fixed");
        form.set_modules(&[]).unwrap();
        assert_matches!(v.begin_save("a"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn failed_save_returns_to_editing_with_form() {
        let mut v = view();
        v.begin_edit("a").unwrap().set_name("Pending");
        v.begin_save("a").unwrap();
        v.fail_save("a").unwrap();

        assert_eq!(v.status("a"), Some(RecordStatus::Editing));
        assert_eq!(v.edit_form_mut("a").unwrap().name(), "Pending");
        assert_eq!(v.get("a").unwrap().name, "Student R1");
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let mut v = view();
        v.request_delete("b").unwrap();
        let removed = v.complete_delete("b").unwrap();

        assert_eq!(removed.roll_no, "R2");
        assert_eq!(v.len(), 2);
        let remaining: Vec<&str> = v.records().map(|r| r.roll_no.as_str()).collect();
        assert_eq!(remaining, ["R1", "R3"]);
    }

    #[test]
    fn declined_or_failed_delete_keeps_record() {
        let mut v = view();
        v.request_delete("b").unwrap();
        v.cancel_delete("b").unwrap();
        assert_eq!(v.status("b"), Some(RecordStatus::Viewing));

        v.request_delete("b").unwrap();
        v.fail_delete("b").unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.status("b"), Some(RecordStatus::Viewing));
    }

    #[test]
    fn delete_without_request_is_conflict() {
        let mut v = view();
        assert_matches!(v.complete_delete("a"), Err(CoreError::Conflict(_)));
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn wrong_state_transitions_are_conflicts() {
        let mut v = view();
        v.begin_edit("a").unwrap();
        assert_matches!(v.request_delete("a"), Err(CoreError::Conflict(_)));
        assert_matches!(v.begin_edit("a"), Err(CoreError::Conflict(_)));
        assert_matches!(v.complete_save("a", &dummy_update()), Err(CoreError::Conflict(_)));
        assert_matches!(v.fail_save("a"), Err(CoreError::Conflict(_)));
        assert_eq!(v.status("a"), Some(RecordStatus::Editing));
        assert_matches!(v.cancel_edit("b"), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut v = view();
        assert_matches!(v.begin_edit("zzz"), Err(CoreError::NotFound { .. }));
        assert_matches!(v.request_delete("zzz"), Err(CoreError::NotFound { .. }));
    }

    fn dummy_update() -> UpdatePayload {
        UpdatePayload {
            roll_no: "R1".into(),
            dob: NaiveDate::from_ymd_opt(2000, 1, 15).unwrap(),
            name: "x".into(),
            course: OFFICE.into(),
            duration: CourseDuration::Months(1),
            internship: vec!["MS Word".into()],
        }
    }
}
