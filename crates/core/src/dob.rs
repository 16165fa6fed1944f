//! Date-of-birth normalization.
//!
//! Records carry their date of birth as a [`NaiveDate`]. On the wire it is
//! always an ISO `YYYY-MM-DD` string. Parsing is lenient at the boundary so
//! that day-month-year text and midnight timestamps written by older
//! clients still resolve to the same calendar date.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serializer};

use crate::error::CoreError;

/// Canonical wire format (`2000-01-15`).
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Display format (`15-01-2000`).
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y";

/// Day-month-year variants accepted on input.
const DAY_FIRST_FORMATS: [&str; 2] = ["%d-%m-%Y", "%d/%m/%Y"];

/// Parse a date of birth from any of the accepted representations.
///
/// Tried in order: ISO date, day-month-year text, RFC 3339 timestamp
/// (the UTC calendar date is kept).
pub fn parse_dob(input: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Date of birth must not be empty".to_string(),
        ));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_FORMAT) {
        return Ok(date);
    }

    for format in DAY_FIRST_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.naive_utc().date());
    }

    Err(CoreError::Validation(format!(
        "Unrecognised date of birth '{trimmed}', expected YYYY-MM-DD or DD-MM-YYYY"
    )))
}

/// ISO representation used in request bodies and QR links.
pub fn to_iso(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Day-month-year representation used when printing records.
pub fn to_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Serde adapter: serialize as ISO, deserialize leniently via [`parse_dob`].
pub mod serde_dob {
    use super::*;

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_iso(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_dob(&raw).map_err(|e| serde::de::Error::custom(e.user_message()))
    }
}
