//! Course catalog: the versioned course → module table.
//!
//! The catalog drives the module checklist of the record form and bounds
//! which modules a record may carry. A default table ships embedded in the
//! binary; deployments can point `CATALOG_PATH` at their own JSON file.
//!
//! File format:
//!
//! ```json
//! { "version": 3, "courses": [ { "name": "...", "modules": ["...", "..."] } ] }
//! ```

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Embedded default catalog.
const DEFAULT_CATALOG_JSON: &str = include_str!("../catalog/default.json");

#[derive(Debug, Deserialize, Serialize)]
struct CatalogFile {
    version: u32,
    courses: Vec<CourseEntry>,
}

#[derive(Debug, Deserialize, Serialize)]
struct CourseEntry {
    name: String,
    modules: Vec<String>,
}

/// Ordered mapping from course name to its ordered module list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCatalog {
    version: u32,
    courses: IndexMap<String, Vec<String>>,
}

impl CourseCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Self {
        Self::from_json(DEFAULT_CATALOG_JSON).expect("embedded course catalog is valid")
    }

    /// Parse and validate a catalog from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let file: CatalogFile = serde_json::from_str(text)
            .map_err(|e| CoreError::InvalidCatalog(format!("malformed catalog JSON: {e}")))?;
        Self::from_entries(file.version, file.courses)
    }

    /// Load a catalog file from disk.
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::InvalidCatalog(format!("cannot read {}: {e}", path.display()))
        })?;
        let catalog = Self::from_json(&text)?;
        tracing::debug!(
            path = %path.display(),
            version = catalog.version,
            courses = catalog.courses.len(),
            "Loaded course catalog",
        );
        Ok(catalog)
    }

    fn from_entries(version: u32, entries: Vec<CourseEntry>) -> Result<Self, CoreError> {
        if entries.is_empty() {
            return Err(CoreError::InvalidCatalog(
                "catalog must contain at least one course".to_string(),
            ));
        }

        let mut courses = IndexMap::with_capacity(entries.len());
        for entry in entries {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return Err(CoreError::InvalidCatalog(
                    "course name must not be empty".to_string(),
                ));
            }
            if courses.contains_key(&name) {
                return Err(CoreError::InvalidCatalog(format!(
                    "duplicate course '{name}'"
                )));
            }

            let mut seen = HashSet::new();
            let mut modules = Vec::with_capacity(entry.modules.len());
            for module in entry.modules {
                let module = module.trim().to_string();
                if module.is_empty() {
                    return Err(CoreError::InvalidCatalog(format!(
                        "course '{name}' has a blank module"
                    )));
                }
                if !seen.insert(module.clone()) {
                    return Err(CoreError::InvalidCatalog(format!(
                        "course '{name}' lists module '{module}' twice"
                    )));
                }
                modules.push(module);
            }
            if modules.is_empty() {
                return Err(CoreError::InvalidCatalog(format!(
                    "course '{name}' has no modules"
                )));
            }

            courses.insert(name, modules);
        }

        Ok(Self { version, courses })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Course names in catalog order.
    pub fn courses(&self) -> impl Iterator<Item = &str> {
        self.courses.keys().map(String::as_str)
    }

    pub fn contains_course(&self, course: &str) -> bool {
        self.courses.contains_key(course)
    }

    /// Modules of `course` in catalog order, `None` for unknown courses.
    pub fn modules(&self, course: &str) -> Option<&[String]> {
        self.courses.get(course).map(Vec::as_slice)
    }

    /// Whether every entry of `selected` belongs to `course`.
    pub fn is_subset(&self, course: &str, selected: &[String]) -> bool {
        match self.modules(course) {
            Some(modules) => selected.iter().all(|m| modules.contains(m)),
            None => false,
        }
    }

    /// Reorder `selected` into catalog order, dropping duplicates and
    /// anything the course does not list.
    pub fn canonical_modules(&self, course: &str, selected: &[String]) -> Vec<String> {
        self.modules(course)
            .map(|modules| {
                modules
                    .iter()
                    .filter(|m| selected.contains(m))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serialize back to the file format.
    pub fn to_json(&self) -> String {
        let file = CatalogFile {
            version: self.version,
            courses: self
                .courses
                .iter()
                .map(|(name, modules)| CourseEntry {
                    name: name.clone(),
                    modules: modules.clone(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&file).expect("catalog is always serialisable")
    }
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::embedded()
    }
}
