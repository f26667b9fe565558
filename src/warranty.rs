//! Warranty term evaluation.
//!
//! An asset's warranty runs from its start date for a whole number of
//! calendar years. The end date and the in-warranty/expired status are
//! derived values; everything here is pure so both the write path and the
//! read path evaluate through the same functions.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Duration applied when the caller supplies none (or a non-positive one).
pub const DEFAULT_DURATION_YEARS: i32 = 1;

#[derive(Debug, Error)]
pub enum WarrantyError {
    #[error("Invalid start date: {0}")]
    InvalidStartDate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyStatus {
    InWarranty,
    Expired,
}

impl WarrantyStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InWarranty => "in_warranty",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computed warranty term for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarrantyTerm {
    pub end_date: NaiveDate,
    pub status: WarrantyStatus,
}

/// Parse the user-supplied start date (ISO-8601 `YYYY-MM-DD`).
///
/// This is the single validation gate before an asset is persisted: an
/// unparseable start date must block the save.
pub fn parse_start_date(raw: &str) -> Result<NaiveDate, WarrantyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(WarrantyError::InvalidStartDate(
            "start date is required".to_string(),
        ));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| WarrantyError::InvalidStartDate(trimmed.to_string()))
}

/// Clamp a raw duration to a positive number of years, defaulting when the
/// caller sent nothing usable.
#[must_use]
pub const fn normalize_duration(raw: Option<i32>) -> i32 {
    match raw {
        Some(years) if years > 0 => years,
        _ => DEFAULT_DURATION_YEARS,
    }
}

/// Calendar-year addition.
///
/// Feb 29 plus N years landing on a non-leap year rolls forward to Mar 1,
/// matching host-calendar semantics rather than 365-day arithmetic.
#[must_use]
pub fn add_years(date: NaiveDate, years: i32) -> NaiveDate {
    let target_year = date.year() + years;

    NaiveDate::from_ymd_opt(target_year, date.month(), date.day()).unwrap_or_else(|| {
        // Only Feb 29 can fail to exist in the target year.
        NaiveDate::from_ymd_opt(target_year, 3, 1).expect("Mar 1 exists in every year")
    })
}

/// Evaluate the warranty term against an explicit `today`.
///
/// `today` is a plain calendar date, so the "normalize to midnight"
/// comparison of the original is the date comparison itself.
#[must_use]
pub fn evaluate(start_date: NaiveDate, duration_years: i32, today: NaiveDate) -> WarrantyTerm {
    let end_date = add_years(start_date, duration_years);
    let status = if today <= end_date {
        WarrantyStatus::InWarranty
    } else {
        WarrantyStatus::Expired
    };

    WarrantyTerm { end_date, status }
}

/// Evaluate against the local calendar date.
#[must_use]
pub fn evaluate_now(start_date: NaiveDate, duration_years: i32) -> WarrantyTerm {
    evaluate(start_date, duration_years, Local::now().date_naive())
}
