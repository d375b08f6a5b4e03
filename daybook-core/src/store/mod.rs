//! Persistence for users, calendars and schedules.
//!
//! Two implementations share one contract: [`SqliteStore`] for real use and
//! [`MemoryStore`] for tests and throwaway sessions. Both evaluate a
//! [`ScheduleFilter`] as one value, with [`ScheduleFilter::matches`] as the
//! reference semantics.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::DaybookResult;
use crate::model::{Calendar, CalendarId, NewSchedule, Schedule, ScheduleId, User, UserId};
use crate::query::ScheduleFilter;

/// Storage operations used by the daybook service.
///
/// Writes are atomic: a failed call leaves nothing behind.
pub trait Store: Send + Sync {
    /// Fails with `DuplicateEmail` if the email is taken.
    fn create_user(&self, email: &str, nickname: Option<&str>) -> DaybookResult<User>;
    fn get_user(&self, id: UserId) -> DaybookResult<Option<User>>;

    /// Calendars owned by `owner`, ordered by id.
    fn list_calendars(&self, owner: UserId) -> DaybookResult<Vec<Calendar>>;
    fn get_calendar(&self, id: CalendarId) -> DaybookResult<Option<Calendar>>;
    fn find_calendar(&self, owner: UserId, title: &str) -> DaybookResult<Option<Calendar>>;
    /// Fails with `DuplicateCalendarTitle` if `owner` already has `title`.
    fn create_calendar(&self, owner: UserId, title: &str) -> DaybookResult<Calendar>;
    fn rename_calendar(&self, id: CalendarId, title: &str) -> DaybookResult<Calendar>;
    /// Also deletes the calendar's schedules.
    fn delete_calendar(&self, id: CalendarId) -> DaybookResult<()>;

    fn create_schedule(&self, new: NewSchedule) -> DaybookResult<Schedule>;
    fn get_schedule(&self, id: ScheduleId) -> DaybookResult<Option<Schedule>>;
    /// Replace every field of schedule `id`.
    fn update_schedule(&self, id: ScheduleId, new: NewSchedule) -> DaybookResult<Schedule>;
    fn delete_schedule(&self, id: ScheduleId) -> DaybookResult<()>;

    /// Schedules selected by `filter`, in no particular order.
    fn find_schedules(&self, filter: &ScheduleFilter) -> DaybookResult<Vec<Schedule>>;
}
