use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cadmin_core::catalog::CourseCatalog;
use cadmin_core::form::ModuleSelectPolicy;
use cadmin_core::qr::DEFAULT_QR_SIZE;

use crate::error::ConsoleError;

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
const DEFAULT_PUBLIC_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_FILE: &str = ".cadmin-session";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Console configuration loaded from environment variables.
///
/// Every field has a default suitable for local development.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Base URL of the student-records backend.
    pub backend_url: String,
    /// Public site the certificate links point at.
    pub public_site_url: String,
    /// Course catalog JSON; the embedded table when unset.
    pub catalog_path: Option<PathBuf>,
    /// Where the login session is kept between runs.
    pub session_file: PathBuf,
    /// Module preselection when a course is picked.
    pub module_select: ModuleSelectPolicy,
    /// Minimum edge length of exported QR images, in pixels.
    pub qr_size: u32,
    /// Per-request timeout in seconds; `0` disables it.
    pub request_timeout_secs: u64,
}

impl ConsoleConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `BACKEND_URL`          | `http://localhost:5000`  |
    /// | `PUBLIC_SITE_URL`      | `http://localhost:3000`  |
    /// | `CATALOG_PATH`         | embedded catalog         |
    /// | `SESSION_FILE`         | `.cadmin-session`        |
    /// | `MODULE_SELECT`        | `all` (`all` or `none`)  |
    /// | `QR_SIZE`              | `220`                    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    pub fn from_env() -> Result<Self, ConsoleError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConsoleError> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend_url = var("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.into());
        let public_site_url = var("PUBLIC_SITE_URL")
            .unwrap_or_else(|| DEFAULT_PUBLIC_SITE_URL.into())
            .trim_end_matches('/')
            .to_string();
        let catalog_path = var("CATALOG_PATH").map(PathBuf::from);
        let session_file = var("SESSION_FILE")
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.into())
            .into();

        let module_select: ModuleSelectPolicy = match var("MODULE_SELECT") {
            Some(v) => v
                .parse()
                .map_err(|_| invalid("MODULE_SELECT", &v, "expected `all` or `none`"))?,
            None => ModuleSelectPolicy::default(),
        };

        let qr_size: u32 = match var("QR_SIZE") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid("QR_SIZE", &v, "expected a positive pixel count"))?,
            None => DEFAULT_QR_SIZE,
        };

        let request_timeout_secs: u64 = match var("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .map_err(|_| invalid("REQUEST_TIMEOUT_SECS", &v, "expected whole seconds"))?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            backend_url,
            public_site_url,
            catalog_path,
            session_file,
            module_select,
            qr_size,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// The course catalog: `CATALOG_PATH` when set, else the embedded one.
    pub fn load_catalog(&self) -> Result<Arc<CourseCatalog>, ConsoleError> {
        let catalog = match &self.catalog_path {
            Some(path) => CourseCatalog::from_path(path)?,
            None => CourseCatalog::embedded(),
        };
        tracing::debug!(
            version = catalog.version(),
            courses = catalog.courses().count(),
            "Course catalog loaded",
        );
        Ok(Arc::new(catalog))
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> ConsoleError {
    ConsoleError::Config(format!("{key}='{value}': {expected}"))
}
