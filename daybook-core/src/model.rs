//! Stored entities: users, calendars and schedules.
//!
//! Participants and memos are referenced by id only. A schedule is owned
//! by exactly one calendar, which is owned by exactly one user.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{DaybookError, DaybookResult};

pub type UserId = i64;
pub type CalendarId = i64;
pub type ScheduleId = i64;
pub type MemoId = i64;

/// Longest accepted calendar or schedule title, in characters.
pub const MAX_TITLE_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: CalendarId,
    pub owner: UserId,
    pub title: String,
}

/// A stored schedule (event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub calendar_id: CalendarId,
    pub title: String,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    /// Stored only; recurring instances are not expanded.
    pub is_repeat: bool,
    pub participants: Vec<UserId>,
    pub memo: Option<MemoId>,
}

impl Schedule {
    /// Last day covered by the schedule. Falls back to `start_date` when no end is set.
    pub fn effective_end(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }
}

/// Validated field set used to create or fully replace a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub calendar_id: CalendarId,
    pub title: String,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub is_repeat: bool,
    pub participants: Vec<UserId>,
    pub memo: Option<MemoId>,
}

impl NewSchedule {
    /// Check that (start_date, start_time) <= (end_date, end_time).
    ///
    /// A missing end date is read as the start date, and times only take part
    /// in the comparison when both are present.
    pub fn check_span(&self) -> DaybookResult<()> {
        let end_date = self.end_date.unwrap_or(self.start_date);

        if end_date < self.start_date {
            return Err(DaybookError::InvalidScheduleSpan);
        }

        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end_date == self.start_date && end < start => {
                Err(DaybookError::InvalidScheduleSpan)
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn into_schedule(self, id: ScheduleId) -> Schedule {
        Schedule {
            id,
            calendar_id: self.calendar_id,
            title: self.title,
            start_date: self.start_date,
            start_time: self.start_time,
            end_date: self.end_date,
            end_time: self.end_time,
            is_repeat: self.is_repeat,
            participants: self.participants,
            memo: self.memo,
        }
    }
}

/// Trim and bound-check a calendar or schedule title.
pub fn normalize_title(title: Option<&str>) -> DaybookResult<String> {
    let title = title
        .map(str::trim)
        .ok_or(DaybookError::MissingRequiredParameter("title"))?;

    if title.is_empty() {
        return Err(DaybookError::InvalidTitle("title must not be blank".into()));
    }

    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DaybookError::InvalidTitle(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn new_schedule() -> NewSchedule {
        NewSchedule {
            calendar_id: 1,
            title: "Meeting".into(),
            start_date: date(2024, 11, 2),
            start_time: None,
            end_date: None,
            end_time: None,
            is_repeat: false,
            participants: vec![],
            memo: None,
        }
    }

    #[test]
    fn effective_end_defaults_to_start() {
        let schedule = new_schedule().into_schedule(1);
        assert_eq!(schedule.effective_end(), date(2024, 11, 2));
    }

    #[test]
    fn span_rejects_end_date_before_start() {
        let mut s = new_schedule();
        s.end_date = Some(date(2024, 11, 1));
        assert!(matches!(s.check_span(), Err(DaybookError::InvalidScheduleSpan)));
    }

    #[test]
    fn span_compares_times_on_same_day() {
        let mut s = new_schedule();
        s.start_time = Some(time(10, 0));
        s.end_time = Some(time(9, 30));
        assert!(s.check_span().is_err());

        s.end_date = Some(date(2024, 11, 3));
        assert!(s.check_span().is_ok());
    }

    #[test]
    fn span_ignores_lone_time() {
        let mut s = new_schedule();
        s.end_time = Some(time(9, 0));
        assert!(s.check_span().is_ok());
    }

    #[test]
    fn title_is_required_and_bounded() {
        assert!(matches!(
            normalize_title(None),
            Err(DaybookError::MissingRequiredParameter("title"))
        ));
        assert!(matches!(
            normalize_title(Some("   ")),
            Err(DaybookError::InvalidTitle(_))
        ));
        assert!(normalize_title(Some(&"x".repeat(51))).is_err());
        assert_eq!(normalize_title(Some("  Work ")).unwrap(), "Work");
    }
}
