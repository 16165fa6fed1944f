//! Student record shapes shared by the form, the directory and the client.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dob::{self, serde_dob};
use crate::duration::CourseDuration;
use crate::types::RecordId;

/// One enrolled student and their course/module selection, as exchanged
/// with the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Backend identity; absent until the record has been created.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub roll_no: String,
    pub name: String,
    #[serde(with = "serde_dob")]
    pub dob: NaiveDate,
    pub course: String,
    /// Selected modules of `course`, in catalog order.
    #[serde(default)]
    pub internship: Vec<String>,
    pub duration: CourseDuration,
}

impl StudentRecord {
    /// Merge the editable fields of an update into this record.
    ///
    /// Identity fields (`id`, `roll_no`, `dob`) are left alone.
    pub fn apply_update(&mut self, update: &UpdatePayload) {
        self.name = update.name.clone();
        self.course = update.course.clone();
        self.duration = update.duration;
        self.internship = update.internship.clone();
    }

    /// Date of birth in display form (`DD-MM-YYYY`).
    pub fn display_dob(&self) -> String {
        dob::to_display(self.dob)
    }
}

/// A record the backend has acknowledged.
///
/// Only values of this type can produce a [`QrArtifact`](crate::qr::QrArtifact).
/// The type does not prove the record was saved: that holds only as long as
/// [`SavedRecord::acknowledged`] is called with backend responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SavedRecord(StudentRecord);

impl SavedRecord {
    /// Wrap a record the backend has returned or acknowledged.
    ///
    /// Call this only from `StudentBackend` implementations, with the record
    /// a successful create or lookup produced. Form drafts never pass here.
    pub fn acknowledged(record: StudentRecord) -> Self {
        Self(record)
    }

    pub fn record(&self) -> &StudentRecord {
        &self.0
    }

    pub fn into_record(self) -> StudentRecord {
        self.0
    }

    /// Apply an acknowledged update, keeping identity fields.
    pub fn merged(mut self, update: &UpdatePayload) -> Self {
        self.0.apply_update(update);
        self
    }
}

impl std::ops::Deref for SavedRecord {
    type Target = StudentRecord;

    fn deref(&self) -> &StudentRecord {
        &self.0
    }
}

/// Identity lookup body for `POST /api/searchStudent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub roll_no: String,
    #[serde(with = "serde_dob")]
    pub dob: NaiveDate,
}

/// Body for `PUT /api/updatestudent`: identity plus the editable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    pub roll_no: String,
    #[serde(with = "serde_dob")]
    pub dob: NaiveDate,
    pub name: String,
    pub course: String,
    pub duration: CourseDuration,
    pub internship: Vec<String>,
}
