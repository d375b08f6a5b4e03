//! In-process store backed by ordered maps.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::Store;
use crate::error::{DaybookError, DaybookResult};
use crate::model::{Calendar, CalendarId, NewSchedule, Schedule, ScheduleId, User, UserId};
use crate::query::ScheduleFilter;

#[derive(Default)]
struct Tables {
    next_user: UserId,
    next_calendar: CalendarId,
    next_schedule: ScheduleId,
    users: BTreeMap<UserId, User>,
    calendars: BTreeMap<CalendarId, Calendar>,
    schedules: BTreeMap<ScheduleId, Schedule>,
}

impl Tables {
    fn title_taken(&self, owner: UserId, title: &str, except: Option<CalendarId>) -> bool {
        self.calendars
            .values()
            .any(|c| c.owner == owner && c.title == title && Some(c.id) != except)
    }

    /// Check references of `new` and normalize its participant list.
    fn check_schedule(&self, mut new: NewSchedule, id: Option<ScheduleId>) -> DaybookResult<NewSchedule> {
        if !self.calendars.contains_key(&new.calendar_id) {
            return Err(DaybookError::CalendarNotFound(new.calendar_id.to_string()));
        }

        new.participants.sort_unstable();
        new.participants.dedup();
        if let Some(missing) = new.participants.iter().find(|u| !self.users.contains_key(u)) {
            return Err(DaybookError::UserNotFound(*missing));
        }

        if let Some(memo) = new.memo {
            let taken = self
                .schedules
                .values()
                .any(|s| s.memo == Some(memo) && Some(s.id) != id);
            if taken {
                return Err(DaybookError::MemoAlreadyAttached(memo));
            }
        }

        Ok(new)
    }
}

/// Volatile [`Store`]; contents are lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn create_user(&self, email: &str, nickname: Option<&str>) -> DaybookResult<User> {
        let mut t = self.tables.write();
        if t.users.values().any(|u| u.email == email) {
            return Err(DaybookError::DuplicateEmail(email.to_string()));
        }

        t.next_user += 1;
        let user = User {
            id: t.next_user,
            email: email.to_string(),
            nickname: nickname.map(str::to_string),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn get_user(&self, id: UserId) -> DaybookResult<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    fn list_calendars(&self, owner: UserId) -> DaybookResult<Vec<Calendar>> {
        Ok(self
            .tables
            .read()
            .calendars
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }

    fn get_calendar(&self, id: CalendarId) -> DaybookResult<Option<Calendar>> {
        Ok(self.tables.read().calendars.get(&id).cloned())
    }

    fn find_calendar(&self, owner: UserId, title: &str) -> DaybookResult<Option<Calendar>> {
        Ok(self
            .tables
            .read()
            .calendars
            .values()
            .find(|c| c.owner == owner && c.title == title)
            .cloned())
    }

    fn create_calendar(&self, owner: UserId, title: &str) -> DaybookResult<Calendar> {
        let mut t = self.tables.write();
        if !t.users.contains_key(&owner) {
            return Err(DaybookError::UserNotFound(owner));
        }
        if t.title_taken(owner, title, None) {
            return Err(DaybookError::DuplicateCalendarTitle(title.to_string()));
        }

        t.next_calendar += 1;
        let calendar = Calendar {
            id: t.next_calendar,
            owner,
            title: title.to_string(),
        };
        t.calendars.insert(calendar.id, calendar.clone());
        Ok(calendar)
    }

    fn rename_calendar(&self, id: CalendarId, title: &str) -> DaybookResult<Calendar> {
        let mut t = self.tables.write();
        let owner = t
            .calendars
            .get(&id)
            .map(|c| c.owner)
            .ok_or_else(|| DaybookError::CalendarNotFound(id.to_string()))?;

        if t.title_taken(owner, title, Some(id)) {
            return Err(DaybookError::DuplicateCalendarTitle(title.to_string()));
        }

        let calendar = t
            .calendars
            .get_mut(&id)
            .ok_or_else(|| DaybookError::CalendarNotFound(id.to_string()))?;
        calendar.title = title.to_string();
        Ok(calendar.clone())
    }

    fn delete_calendar(&self, id: CalendarId) -> DaybookResult<()> {
        let mut t = self.tables.write();
        if t.calendars.remove(&id).is_none() {
            return Err(DaybookError::CalendarNotFound(id.to_string()));
        }
        t.schedules.retain(|_, s| s.calendar_id != id);
        Ok(())
    }

    fn create_schedule(&self, new: NewSchedule) -> DaybookResult<Schedule> {
        let mut t = self.tables.write();
        let new = t.check_schedule(new, None)?;

        t.next_schedule += 1;
        let schedule = new.into_schedule(t.next_schedule);
        t.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    fn get_schedule(&self, id: ScheduleId) -> DaybookResult<Option<Schedule>> {
        Ok(self.tables.read().schedules.get(&id).cloned())
    }

    fn update_schedule(&self, id: ScheduleId, new: NewSchedule) -> DaybookResult<Schedule> {
        let mut t = self.tables.write();
        if !t.schedules.contains_key(&id) {
            return Err(DaybookError::ScheduleNotFound(id));
        }
        let new = t.check_schedule(new, Some(id))?;

        let schedule = new.into_schedule(id);
        t.schedules.insert(id, schedule.clone());
        Ok(schedule)
    }

    fn delete_schedule(&self, id: ScheduleId) -> DaybookResult<()> {
        self.tables
            .write()
            .schedules
            .remove(&id)
            .map(|_| ())
            .ok_or(DaybookError::ScheduleNotFound(id))
    }

    fn find_schedules(&self, filter: &ScheduleFilter) -> DaybookResult<Vec<Schedule>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let t = self.tables.read();
        Ok(t.schedules
            .values()
            .filter(|s| {
                t.calendars
                    .get(&s.calendar_id)
                    .is_some_and(|c| filter.matches(s, c.owner))
            })
            .cloned()
            .collect())
    }
}
