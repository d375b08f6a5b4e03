//! Schedule query planning.
//!
//! A query is reduced to one [`ScheduleFilter`] value holding every predicate
//! (owner, date window, calendar scope). Stores receive the whole filter and
//! decide how to evaluate it; [`ScheduleFilter::matches`] is the reference
//! semantics they must agree with.

use serde::Serialize;
use tracing::debug;

use crate::calendar_filter::CalendarScope;
use crate::date_range::DateRange;
use crate::model::{Schedule, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleFilter {
    /// Only schedules in calendars owned by this user. Always enforced.
    pub owner: UserId,
    /// Schedules whose effective span overlaps this window.
    pub range: DateRange,
    pub calendars: CalendarScope,
}

impl ScheduleFilter {
    pub fn new(owner: UserId, range: DateRange, calendars: CalendarScope) -> Self {
        let filter = ScheduleFilter {
            owner,
            range,
            calendars,
        };
        debug!(?filter, "planned schedule query");
        filter
    }

    /// True if `schedule`, stored in a calendar owned by `calendar_owner`, is selected.
    ///
    /// Matches iff `start_date <= range.end && effective_end >= range.start`,
    /// so multi-day schedules that begin before the window still count.
    pub fn matches(&self, schedule: &Schedule, calendar_owner: UserId) -> bool {
        calendar_owner == self.owner
            && self.calendars.contains(schedule.calendar_id)
            && self
                .range
                .overlaps(schedule.start_date, schedule.effective_end())
    }

    /// True if the filter can never select anything.
    pub fn is_empty(&self) -> bool {
        matches!(&self.calendars, CalendarScope::Only(ids) if ids.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn schedule(calendar_id: i64, start: NaiveDate, end: Option<NaiveDate>) -> Schedule {
        Schedule {
            id: 1,
            calendar_id,
            title: "s".into(),
            start_date: start,
            start_time: None,
            end_date: end,
            end_time: None,
            is_repeat: false,
            participants: vec![],
            memo: None,
        }
    }

    fn week_filter(calendars: CalendarScope) -> ScheduleFilter {
        ScheduleFilter::new(
            7,
            DateRange {
                start: date(2024, 11, 4),
                end: date(2024, 11, 10),
            },
            calendars,
        )
    }

    #[test]
    fn overlap_law() {
        let filter = week_filter(CalendarScope::All);

        // starts before, ends inside
        assert!(filter.matches(&schedule(1, date(2024, 11, 1), Some(date(2024, 11, 4))), 7));
        // spans the whole window
        assert!(filter.matches(&schedule(1, date(2024, 10, 1), Some(date(2024, 12, 1))), 7));
        // single day inside
        assert!(filter.matches(&schedule(1, date(2024, 11, 10), None), 7));
        // entirely before
        assert!(!filter.matches(&schedule(1, date(2024, 11, 1), Some(date(2024, 11, 3))), 7));
        // entirely after
        assert!(!filter.matches(&schedule(1, date(2024, 11, 11), None), 7));
    }

    #[test]
    fn owner_is_enforced_regardless_of_scope() {
        let filter = week_filter(CalendarScope::Only(BTreeSet::from([1])));
        let s = schedule(1, date(2024, 11, 5), None);
        assert!(filter.matches(&s, 7));
        assert!(!filter.matches(&s, 8));
    }

    #[test]
    fn calendar_scope_restricts() {
        let filter = week_filter(CalendarScope::Only(BTreeSet::from([1])));
        assert!(!filter.matches(&schedule(2, date(2024, 11, 5), None), 7));
        assert!(!filter.is_empty());
        assert!(week_filter(CalendarScope::Only(BTreeSet::new())).is_empty());
    }
}
