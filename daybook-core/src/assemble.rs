//! Ordering and response shaping for query results.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::model::{Calendar, CalendarId, MemoId, Schedule, ScheduleId, UserId};

/// Calendar reference embedded in each schedule in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarRef {
    pub id: CalendarId,
    pub title: String,
}

/// A schedule as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleView {
    pub id: ScheduleId,
    pub calendar: CalendarRef,
    pub title: String,
    pub start_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
    pub is_repeat: bool,
    pub participants: Vec<UserId>,
    pub memo: Option<MemoId>,
}

/// Order by (start_date, start_time) ascending, then by id.
///
/// All-day schedules (no start time) sort before timed ones on the same date.
pub fn compare_schedules(a: &Schedule, b: &Schedule) -> Ordering {
    (a.start_date, a.start_time, a.id).cmp(&(b.start_date, b.start_time, b.id))
}

pub fn order_schedules(schedules: &mut [Schedule]) {
    schedules.sort_by(compare_schedules);
}

/// Attach calendar references.
///
/// Schedules whose calendar is not in `calendars` are dropped; callers pass
/// the requester's own calendars, so nothing outside their ownership leaks.
pub fn assemble(schedules: Vec<Schedule>, calendars: &[Calendar]) -> Vec<ScheduleView> {
    let by_id: HashMap<CalendarId, &Calendar> = calendars.iter().map(|c| (c.id, c)).collect();

    schedules
        .into_iter()
        .filter_map(|s| {
            let calendar = by_id.get(&s.calendar_id)?;
            Some(view(s, calendar))
        })
        .collect()
}

pub fn view(schedule: Schedule, calendar: &Calendar) -> ScheduleView {
    ScheduleView {
        id: schedule.id,
        calendar: CalendarRef {
            id: calendar.id,
            title: calendar.title.clone(),
        },
        title: schedule.title,
        start_date: schedule.start_date,
        start_time: schedule.start_time,
        end_date: schedule.end_date,
        end_time: schedule.end_time,
        is_repeat: schedule.is_repeat,
        participants: schedule.participants,
        memo: schedule.memo,
    }
}
