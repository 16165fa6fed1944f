//! QR artifact for the public certificate page.
//!
//! The link format is `<public-site>/#/internship/<rollNo>-<YYYY-MM-DD>`.
//! Artifacts are derived from a [`SavedRecord`] only and are never
//! persisted; the console prints the link and writes `<rollNo>-qr.png`.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use regex::Regex;

use crate::dob;
use crate::error::CoreError;
use crate::student::SavedRecord;

/// Default minimum edge length of the rendered code, in pixels.
pub const DEFAULT_QR_SIZE: u32 = 220;

/// Path segment between the public site and the record key.
const LINK_SEGMENT: &str = "/#/internship/";

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<site>.+)/#/internship/(?P<roll>.+)-(?P<dob>\d{4}-\d{2}-\d{2})$")
        .expect("valid regex")
});

/// A scannable link to one saved record's certificate page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrArtifact {
    roll_no: String,
    dob: NaiveDate,
    link: String,
}

impl QrArtifact {
    /// Derive the artifact for an acknowledged record.
    pub fn for_record(record: &SavedRecord, public_site: &str) -> Self {
        let link = format!(
            "{}{LINK_SEGMENT}{}-{}",
            public_site.trim_end_matches('/'),
            record.roll_no,
            dob::to_iso(record.dob),
        );
        Self {
            roll_no: record.roll_no.clone(),
            dob: record.dob,
            link,
        }
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn roll_no(&self) -> &str {
        &self.roll_no
    }

    pub fn dob(&self) -> NaiveDate {
        self.dob
    }

    /// Download filename: `<rollNo>-qr.png`, with path-unsafe characters
    /// replaced by `_`.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .roll_no
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{safe}-qr.png")
    }

    /// Render the link as a PNG at least `min_size` pixels wide.
    pub fn render_png(&self, min_size: u32) -> Result<Vec<u8>, CoreError> {
        let code = QrCode::new(self.link.as_bytes())
            .map_err(|e| CoreError::Export(format!("cannot encode QR code: {e}")))?;
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(min_size, min_size)
            .build();

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| CoreError::Export(format!("cannot encode PNG: {e}")))?;
        Ok(bytes)
    }

    /// Write the PNG into `dir` and return the file path.
    pub fn write_png(&self, dir: &Path, min_size: u32) -> Result<PathBuf, CoreError> {
        let path = dir.join(self.file_name());
        let bytes = self.render_png(min_size)?;
        std::fs::write(&path, bytes)
            .map_err(|e| CoreError::Export(format!("cannot write {}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), roll_no = %self.roll_no, "Wrote QR code");
        Ok(path)
    }
}

/// Components recovered from a certificate link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub public_site: String,
    pub roll_no: String,
    pub dob: NaiveDate,
}

/// Split a certificate link back into site, roll number and date of birth.
///
/// The date is always the trailing `YYYY-MM-DD`, so roll numbers that
/// contain `-` survive the round trip.
pub fn parse_link(link: &str) -> Result<ParsedLink, CoreError> {
    let invalid = || CoreError::Validation(format!("Not a certificate link: '{link}'"));
    let caps = LINK_RE.captures(link.trim()).ok_or_else(invalid)?;
    let dob = NaiveDate::parse_from_str(&caps["dob"], dob::ISO_FORMAT).map_err(|_| invalid())?;
    Ok(ParsedLink {
        public_site: caps["site"].to_string(),
        roll_no: caps["roll"].to_string(),
        dob,
    })
}
