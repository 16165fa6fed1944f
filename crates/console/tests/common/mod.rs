//! In-memory `StudentBackend` with call counters and failure switches.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cadmin_client::backend::StudentBackend;
use cadmin_client::error::BackendError;
use cadmin_console::directory::Confirm;
use cadmin_console::error::ConsoleError;
use cadmin_core::catalog::CourseCatalog;
use cadmin_core::duration::CourseDuration;
use cadmin_core::student::{LookupRequest, SavedRecord, StudentRecord, UpdatePayload};
use chrono::NaiveDate;

pub const OFFICE: &str = "Certification in MS Office";
pub const FRONTEND: &str = "Certification in FRONTEND";

/// Which calls should fail, and how.
#[derive(Debug, Default, Clone, Copy)]
pub struct Failures {
    pub create: Option<Fail>,
    pub lookup: Option<Fail>,
    pub list: Option<Fail>,
    pub update: Option<Fail>,
    pub delete: Option<Fail>,
}

#[derive(Debug, Clone, Copy)]
pub enum Fail {
    NotFound,
    Duplicate,
    Server,
    /// A 401/403 with no error body.
    Unauthorized,
}

impl Fail {
    fn error(self) -> BackendError {
        match self {
            Fail::NotFound => BackendError::NotFound,
            Fail::Duplicate => {
                BackendError::Validation("Student with this Roll No already exists".into())
            }
            Fail::Server => BackendError::Rejected {
                status: 500,
                message: None,
            },
            Fail::Unauthorized => BackendError::Unauthorized(None),
        }
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<Vec<StudentRecord>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    updates: Mutex<Vec<UpdatePayload>>,
    failures: Mutex<Failures>,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_records(records: Vec<StudentRecord>) -> Arc<Self> {
        let backend = Self::default();
        for mut record in records {
            let n = backend.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            record.id.get_or_insert_with(|| format!("id-{n}"));
            backend.records.lock().unwrap().push(record);
        }
        Arc::new(backend)
    }

    pub fn fail(&self, set: impl FnOnce(&mut Failures)) {
        set(&mut self.failures.lock().unwrap());
    }

    /// Total backend calls made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn records(&self) -> Vec<StudentRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn updates(&self) -> Vec<UpdatePayload> {
        self.updates.lock().unwrap().clone()
    }

    fn enter(&self, pick: impl FnOnce(&Failures) -> Option<Fail>) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match pick(&self.failures.lock().unwrap()) {
            Some(fail) => Err(fail.error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StudentBackend for MemoryBackend {
    async fn create_student(&self, record: &StudentRecord) -> Result<SavedRecord, BackendError> {
        self.enter(|f| f.create)?;
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.roll_no == record.roll_no) {
            return Err(Fail::Duplicate.error());
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut saved = record.clone();
        saved.id = Some(format!("id-{n}"));
        records.push(saved.clone());
        Ok(SavedRecord::acknowledged(saved))
    }

    async fn lookup_student(&self, request: &LookupRequest) -> Result<SavedRecord, BackendError> {
        self.enter(|f| f.lookup)?;
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.roll_no == request.roll_no && r.dob == request.dob)
            .cloned()
            .map(SavedRecord::acknowledged)
            .ok_or(BackendError::NotFound)
    }

    async fn list_students(&self) -> Result<Vec<StudentRecord>, BackendError> {
        self.enter(|f| f.list)?;
        Ok(self.records())
    }

    async fn update_student(&self, update: &UpdatePayload) -> Result<(), BackendError> {
        self.enter(|f| f.update)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.roll_no == update.roll_no)
            .ok_or(BackendError::NotFound)?;
        record.apply_update(update);
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }

    async fn delete_student(&self, id: &str) -> Result<(), BackendError> {
        self.enter(|f| f.delete)?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        if records.len() == before {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}

/// Answers confirmation prompts from a fixed script.
pub struct Scripted {
    pub answer: bool,
    pub prompts: Vec<String>,
}

impl Scripted {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl Confirm for Scripted {
    fn confirm(&mut self, prompt: &str) -> Result<bool, ConsoleError> {
        self.prompts.push(prompt.to_string());
        Ok(self.answer)
    }
}

pub fn catalog() -> Arc<CourseCatalog> {
    Arc::new(CourseCatalog::embedded())
}

pub fn dob() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 15).unwrap()
}

pub fn record(roll_no: &str, name: &str, course: &str) -> StudentRecord {
    let catalog = CourseCatalog::embedded();
    StudentRecord {
        id: None,
        roll_no: roll_no.to_string(),
        name: name.to_string(),
        dob: dob(),
        course: course.to_string(),
        internship: catalog.modules(course).unwrap_or_default().to_vec(),
        duration: CourseDuration::Months(3),
    }
}
