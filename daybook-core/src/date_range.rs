//! Date range for filtering schedules.
//!
//! A query names a reference date and a view; the view decides how wide the
//! window around the reference date is. Weeks start on Monday (ISO 8601).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, DaybookResult};

/// Window size of a schedule query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// The reference date only. Used when the client sends no view.
    #[default]
    Daily,
    /// Monday through Sunday of the reference date's week.
    Weekly,
    /// First through last day of the reference date's month.
    Monthly,
}

impl FromStr for ViewMode {
    type Err = DaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(ViewMode::Daily),
            "weekly" => Ok(ViewMode::Weekly),
            "monthly" => Ok(ViewMode::Monthly),
            _ => Err(DaybookError::InvalidViewMode(s.to_string())),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewMode::Daily => "daily",
            ViewMode::Weekly => "weekly",
            ViewMode::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl ViewMode {
    /// Parse an optional client-supplied view, defaulting to daily when absent.
    pub fn from_param(view: Option<&str>) -> DaybookResult<Self> {
        match view {
            None => Ok(ViewMode::default()),
            Some(s) => s.parse(),
        }
    }
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Resolve the window for `view` around `reference`.
    pub fn resolve(reference: NaiveDate, view: ViewMode) -> DaybookResult<Self> {
        let out_of_range = || DaybookError::InvalidDateFormat(reference.to_string());

        let (start, end) = match view {
            ViewMode::Daily => (reference, reference),
            ViewMode::Weekly => {
                let offset = u64::from(reference.weekday().num_days_from_monday());
                let start = reference
                    .checked_sub_days(Days::new(offset))
                    .ok_or_else(out_of_range)?;
                let end = start.checked_add_days(Days::new(6)).ok_or_else(out_of_range)?;
                (start, end)
            }
            ViewMode::Monthly => {
                let start = reference.with_day(1).ok_or_else(out_of_range)?;
                let (year, month) = if reference.month() == 12 {
                    (reference.year() + 1, 1)
                } else {
                    (reference.year(), reference.month() + 1)
                };
                let end = NaiveDate::from_ymd_opt(year, month, 1)
                    .and_then(|next| next.pred_opt())
                    .ok_or_else(out_of_range)?;
                (start, end)
            }
        };

        Ok(DateRange { start, end })
    }

    /// True when the inclusive span `[start, end]` intersects this range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    /// Number of days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Parse a client-supplied reference date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times (the date is taken in the
/// offset the client sent), and naive date-times with an optional fraction.
pub fn parse_reference_date(input: Option<&str>) -> DaybookResult<NaiveDate> {
    let s = input
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(DaybookError::MissingRequiredParameter("start_date"))?;

    parse_date(s)
}

/// Years representable with the four-digit `YYYY` form.
const ISO_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parse an ISO-8601 date or date-time into its calendar date.
///
/// Expanded years (`+10000-01-01`) are rejected along with malformed input.
pub fn parse_date(s: &str) -> DaybookResult<NaiveDate> {
    parse_any_date(s)
        .filter(|date| ISO_YEARS.contains(&date.year()))
        .ok_or_else(|| DaybookError::InvalidDateFormat(s.to_string()))
}

fn parse_any_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}
