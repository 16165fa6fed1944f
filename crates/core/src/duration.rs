//! Programme duration labels.
//!
//! Durations travel as label text (`"10 Days"`, `"1 Month"`, `"6 Months"`).
//! Older records stored a bare month count, so a JSON number or a numeric
//! string is read back as that many months.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Maximum month count offered by the console.
pub const MAX_MONTHS: u8 = 12;

/// Day-length programmes offered alongside the month options.
pub const DAY_OPTIONS: [u16; 2] = [10, 15];

/// Length of a certification programme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CourseDuration {
    Days(u16),
    Months(u8),
}

impl CourseDuration {
    /// Build a month duration, enforcing `1..=12`.
    pub fn months(count: u8) -> Result<Self, CoreError> {
        if !(1..=MAX_MONTHS).contains(&count) {
            return Err(CoreError::Validation(format!(
                "Duration must be between 1 and {MAX_MONTHS} months, got {count}"
            )));
        }
        Ok(CourseDuration::Months(count))
    }

    /// Build a day duration; zero days is rejected.
    pub fn days(count: u16) -> Result<Self, CoreError> {
        if count == 0 {
            return Err(CoreError::Validation(
                "Duration in days must be positive".to_string(),
            ));
        }
        Ok(CourseDuration::Days(count))
    }

    /// The standard option list: `10 Days`, `15 Days`, `1 Month` .. `12 Months`.
    pub fn options() -> Vec<CourseDuration> {
        DAY_OPTIONS
            .iter()
            .map(|d| CourseDuration::Days(*d))
            .chain((1..=MAX_MONTHS).map(CourseDuration::Months))
            .collect()
    }
}

impl fmt::Display for CourseDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseDuration::Days(1) => write!(f, "1 Day"),
            CourseDuration::Days(n) => write!(f, "{n} Days"),
            CourseDuration::Months(1) => write!(f, "1 Month"),
            CourseDuration::Months(n) => write!(f, "{n} Months"),
        }
    }
}

impl FromStr for CourseDuration {
    type Err = CoreError;

    /// Accepts `"N Days"`, `"N Month(s)"` (case-insensitive) or a bare month count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation(
                "Duration must not be empty".to_string(),
            ));
        }

        if let Ok(count) = trimmed.parse::<u8>() {
            return CourseDuration::months(count);
        }

        let invalid = || CoreError::Validation(format!("Unrecognised duration '{trimmed}'"));

        let mut parts = trimmed.split_whitespace();
        let (Some(count), Some(unit), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        match unit.to_ascii_lowercase().as_str() {
            "day" | "days" => CourseDuration::days(count.parse().map_err(|_| invalid())?),
            "month" | "months" => CourseDuration::months(count.parse().map_err(|_| invalid())?),
            _ => Err(invalid()),
        }
    }
}

impl Serialize for CourseDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CourseDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(u64),
            Label(String),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Count(n) => u8::try_from(n)
                .map_err(|_| {
                    CoreError::Validation(format!("Duration of {n} months is out of range"))
                })
                .and_then(CourseDuration::months),
            Raw::Label(label) => label.parse(),
        };
        parsed.map_err(|e| serde::de::Error::custom(e.user_message()))
    }
}
