//! Command dispatch and console output.

use std::path::Path;
use std::sync::Arc;

use cadmin_client::api::BackendApi;
use cadmin_client::backend::StudentBackend;
use cadmin_client::session::{LoginRequest, Session, SessionStore};
use cadmin_core::catalog::CourseCatalog;
use cadmin_core::directory::DirectoryView;
use cadmin_core::form::{EditDraft, RecordForm};
use cadmin_core::qr::QrArtifact;
use cadmin_core::student::StudentRecord;

use crate::cli::{AddArgs, AmendArgs, Cli, Cmd, EditArgs};
use crate::config::ConsoleConfig;
use crate::directory::{
    AssumeYes, Confirm, DeleteOutcome, DirectoryService, EditChanges, PromptConfirm,
};
use crate::error::ConsoleError;
use crate::search::SearchService;
use crate::workflow::{SubmissionWorkflow, UpdateWorkflow};

/// Everything a command needs, built once in `main`.
pub struct App {
    config: ConsoleConfig,
    catalog: Arc<CourseCatalog>,
    sessions: SessionStore,
}

impl App {
    pub fn new(config: ConsoleConfig, catalog: Arc<CourseCatalog>) -> Self {
        let sessions = SessionStore::new(config.session_file.clone());
        Self {
            config,
            catalog,
            sessions,
        }
    }

    pub fn catalog(&self) -> &Arc<CourseCatalog> {
        &self.catalog
    }

    /// The stored session; commands behind the login gate fail without one.
    pub fn require_session(&self) -> Result<Session, ConsoleError> {
        self.sessions.load()?.ok_or(ConsoleError::NotLoggedIn)
    }

    fn api(&self) -> Result<BackendApi, ConsoleError> {
        Ok(BackendApi::new(
            &self.config.backend_url,
            self.config.request_timeout(),
        )?)
    }

    /// Client authenticated with the stored session.
    fn backend(&self) -> Result<Arc<dyn StudentBackend>, ConsoleError> {
        let session = self.require_session()?;
        tracing::debug!(email = %session.email, "Using stored session");
        Ok(Arc::new(self.api()?.with_session(&session)))
    }

    fn directory(&self, backend: Arc<dyn StudentBackend>) -> DirectoryService {
        DirectoryService::new(backend, Arc::clone(&self.catalog), self.config.module_select)
    }

    /// Run one command.
    pub async fn run(&self, cli: Cli) -> Result<(), ConsoleError> {
        match cli.cmd {
            Cmd::Login { email, password } => self.login(&email, &password).await,
            Cmd::Logout => self.logout(),
            Cmd::Catalog { json } => {
                self.print_catalog(json);
                Ok(())
            }
            Cmd::Add(args) => self.add(args).await,
            Cmd::Search(args) => {
                let record = SearchService::new(self.backend()?)
                    .lookup(&args.roll_no, &args.dob)
                    .await?
                    .into_found()?;
                print_record(&record);
                Ok(())
            }
            Cmd::List { json } => self.list(json).await,
            Cmd::Edit(args) => self.edit(args).await,
            Cmd::Amend(args) => self.amend(args).await,
            Cmd::Delete { id, yes } => self.delete(&id, yes).await,
            Cmd::Qr { lookup, out } => {
                let record = SearchService::new(self.backend()?)
                    .lookup(&lookup.roll_no, &lookup.dob)
                    .await?
                    .into_found()?;
                let qr = QrArtifact::for_record(&record, &self.config.public_site_url);
                self.export_qr(&qr, &out)
            }
        }
    }

    // ---- session ----

    async fn login(&self, email: &str, password: &str) -> Result<(), ConsoleError> {
        let session = self.api()?.login(&LoginRequest::new(email, password)).await?;
        self.sessions.save(&session)?;
        println!("Logged in as {}", session.email);
        Ok(())
    }

    fn logout(&self) -> Result<(), ConsoleError> {
        if self.sessions.clear()? {
            tracing::info!(path = %self.sessions.path().display(), "Session cleared");
            println!("Logged out");
        } else {
            println!("Not logged in");
        }
        Ok(())
    }

    // ---- records ----

    async fn add(&self, args: AddArgs) -> Result<(), ConsoleError> {
        let backend = self.backend()?;
        let mut form = RecordForm::new(Arc::clone(&self.catalog), self.config.module_select);
        form.set_roll_no(args.roll_no.as_deref().unwrap_or_default());
        form.set_name(args.name.as_deref().unwrap_or_default());
        form.set_dob(args.dob.as_deref().unwrap_or_default())?;
        if let Some(course) = &args.course {
            form.set_course(course)?;
        }
        if !args.modules.is_empty() {
            form.set_modules(&args.modules)?;
        }
        form.set_duration(args.duration);

        let submission = SubmissionWorkflow::new(backend, self.config.public_site_url.clone())
            .submit(&mut form)
            .await?;
        println!("Student added successfully!");
        print_record(&submission.record);
        self.export_qr(&submission.qr, &args.out)
    }

    async fn list(&self, json: bool) -> Result<(), ConsoleError> {
        let mut directory = self.directory(self.backend()?);
        directory.refresh().await?;
        let groups = directory.view().grouped_by_course();
        if json {
            let text = serde_json::to_string_pretty(&groups)
                .expect("student records are always serialisable");
            println!("{text}");
        } else {
            print_directory(directory.view());
        }
        Ok(())
    }

    async fn edit(&self, args: EditArgs) -> Result<(), ConsoleError> {
        let mut directory = self.directory(self.backend()?);
        directory.refresh().await?;
        let changes = EditChanges {
            name: args.name,
            course: args.course,
            modules: (!args.modules.is_empty()).then_some(args.modules),
            duration: args.duration,
        };
        directory.edit(&args.id, &changes).await?;

        println!("Student updated successfully!");
        if let Some(record) = directory.view().get(&args.id) {
            print_record(record);
        }
        Ok(())
    }

    async fn amend(&self, args: AmendArgs) -> Result<(), ConsoleError> {
        let backend = self.backend()?;
        let saved = SearchService::new(Arc::clone(&backend))
            .lookup(&args.lookup.roll_no, &args.lookup.dob)
            .await?
            .into_found()?;

        let mut draft = EditDraft::from_record(&saved);
        if let Some(name) = args.name {
            draft.name = name;
        }
        if let Some(course) = args.course {
            draft.course = course;
        }
        if args.duration.is_some() {
            draft.duration = args.duration;
        }

        let updated = UpdateWorkflow::new(backend, Arc::clone(&self.catalog))
            .update_saved(&saved, draft)
            .await?;
        println!("Student updated successfully!");
        print_record(&updated);
        Ok(())
    }

    async fn delete(&self, id: &str, yes: bool) -> Result<(), ConsoleError> {
        let mut directory = self.directory(self.backend()?);
        directory.refresh().await?;

        let mut assume_yes = AssumeYes;
        let mut prompt;
        let confirm: &mut dyn Confirm = if yes {
            &mut assume_yes
        } else {
            prompt = PromptConfirm::stdio();
            &mut prompt
        };
        match directory.delete(id, confirm).await? {
            DeleteOutcome::Deleted(record) => {
                println!("Deleted {} ({})", record.name, record.roll_no);
            }
            DeleteOutcome::Cancelled => println!("Delete cancelled"),
        }
        Ok(())
    }

    fn export_qr(&self, qr: &QrArtifact, out: &Path) -> Result<(), ConsoleError> {
        std::fs::create_dir_all(out)?;
        let path = qr.write_png(out, self.config.qr_size)?;
        println!("QR link: {}", qr.link());
        println!("QR code saved to {}", path.display());
        Ok(())
    }

    fn print_catalog(&self, json: bool) {
        if json {
            println!("{}", self.catalog.to_json());
            return;
        }
        println!("Course catalog v{}", self.catalog.version());
        for course in self.catalog.courses() {
            println!("{course}");
            for module in self.catalog.modules(course).unwrap_or_default() {
                println!("  - {module}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_record(record: &StudentRecord) {
    if let Some(id) = &record.id {
        println!("  Id:        {id}");
    }
    println!("  Roll No:   {}", record.roll_no);
    println!("  Name:      {}", record.name);
    println!("  DOB:       {}", record.display_dob());
    println!("  Course:    {}", record.course);
    println!("  Modules:   {}", record.internship.join(", "));
    println!("  Duration:  {}", record.duration);
}

fn print_directory(view: &DirectoryView) {
    if view.is_empty() {
        println!("No students found.");
        return;
    }
    for (course, records) in view.grouped_by_course() {
        println!("{course} ({})", records.len());
        for record in records {
            println!(
                "  {:<26} {:<12} {:<24} {}  {}",
                record.id.as_deref().unwrap_or("-"),
                record.roll_no,
                record.name,
                record.display_dob(),
                record.duration,
            );
        }
    }
}
