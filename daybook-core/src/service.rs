//! Calendar and schedule operations on behalf of a requesting user.
//!
//! Inputs arrive as raw client parameters ([`ScheduleQuery`],
//! [`ScheduleInput`]); everything is validated before the store is touched
//! for writing.

use std::sync::Arc;

use chrono::NaiveTime;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::assemble::{ScheduleView, assemble, order_schedules, view};
use crate::calendar_filter::resolve_calendar_ids;
use crate::date_range::{DateRange, ViewMode, parse_date, parse_reference_date};
use crate::error::{DaybookError, DaybookResult};
use crate::model::{
    Calendar, CalendarId, MemoId, NewSchedule, Schedule, ScheduleId, User, UserId,
    normalize_title,
};
use crate::pagination::{Page, PageRequest, PaginationConfig, paginate};
use crate::query::ScheduleFilter;
use crate::store::Store;

/// Raw parameters of a schedule listing.
///
/// A single-valued key sent more than once keeps all of its values joined
/// with `,`, so it fails the same validation as any other malformed value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleQuery {
    /// Reference date, ISO-8601 date or date-time. Required.
    #[serde(default, deserialize_with = "joined")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "joined")]
    pub view: Option<String>,
    /// Calendar titles to restrict to.
    #[serde(default, rename = "calendar[]")]
    pub calendars: Vec<String>,
    #[serde(default, deserialize_with = "joined")]
    pub page: Option<String>,
    #[serde(default, deserialize_with = "joined")]
    pub page_size: Option<String>,
}

fn joined<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<String>::deserialize(deserializer)?;
    Ok((!values.is_empty()).then(|| values.join(",")))
}

/// Raw fields for creating or replacing a schedule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInput {
    pub calendar: Option<CalendarId>,
    pub title: Option<String>,
    pub start_date: Option<String>,
    pub start_time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_repeat: bool,
    #[serde(default)]
    pub participants: Vec<UserId>,
    pub memo: Option<MemoId>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse `HH:MM` or `HH:MM:SS` (with optional fraction).
pub fn parse_time(s: &str) -> DaybookResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| DaybookError::InvalidTimeFormat(s.to_string()))
}

impl ScheduleInput {
    fn into_new_schedule(self) -> DaybookResult<NewSchedule> {
        let calendar_id = self
            .calendar
            .ok_or(DaybookError::MissingRequiredParameter("calendar"))?;
        let title = normalize_title(self.title.as_deref())?;
        let start_date = present(self.start_date.as_deref())
            .ok_or(DaybookError::MissingRequiredParameter("start_date"))
            .and_then(parse_date)?;

        let new = NewSchedule {
            calendar_id,
            title,
            start_date,
            start_time: present(self.start_time.as_deref()).map(parse_time).transpose()?,
            end_date: present(self.end_date.as_deref()).map(parse_date).transpose()?,
            end_time: present(self.end_time.as_deref()).map(parse_time).transpose()?,
            is_repeat: self.is_repeat,
            participants: self.participants,
            memo: self.memo,
        };
        new.check_span()?;
        Ok(new)
    }
}

/// Entry point for every daybook operation.
#[derive(Clone)]
pub struct Daybook {
    store: Arc<dyn Store>,
    pagination: PaginationConfig,
}

impl Daybook {
    pub fn new(store: Arc<dyn Store>, pagination: PaginationConfig) -> Self {
        Daybook { store, pagination }
    }

    pub fn pagination(&self) -> &PaginationConfig {
        &self.pagination
    }

    // Users

    pub fn create_user(&self, email: &str, nickname: Option<&str>) -> DaybookResult<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(DaybookError::MissingRequiredParameter("email"));
        }
        let user = self.store.create_user(email, present(nickname))?;
        info!(user = user.id, "user created");
        Ok(user)
    }

    pub fn user(&self, id: UserId) -> DaybookResult<User> {
        self.store.get_user(id)?.ok_or(DaybookError::UserNotFound(id))
    }

    // Calendars

    pub fn list_calendars(&self, user: UserId) -> DaybookResult<Vec<Calendar>> {
        self.store.list_calendars(user)
    }

    pub fn get_calendar(&self, user: UserId, title: &str) -> DaybookResult<Calendar> {
        self.store
            .find_calendar(user, title)?
            .ok_or_else(|| DaybookError::CalendarNotFound(title.to_string()))
    }

    pub fn create_calendar(&self, user: UserId, title: Option<&str>) -> DaybookResult<Calendar> {
        let title = normalize_title(title)?;
        let calendar = self.store.create_calendar(user, &title)?;
        info!(user, calendar = calendar.id, "calendar created");
        Ok(calendar)
    }

    pub fn rename_calendar(
        &self,
        user: UserId,
        title: &str,
        new_title: Option<&str>,
    ) -> DaybookResult<Calendar> {
        let new_title = normalize_title(new_title)?;
        let calendar = self.get_calendar(user, title)?;
        if calendar.title == new_title {
            return Ok(calendar);
        }

        let renamed = self.store.rename_calendar(calendar.id, &new_title)?;
        info!(user, calendar = renamed.id, "calendar renamed");
        Ok(renamed)
    }

    pub fn delete_calendar(&self, user: UserId, title: &str) -> DaybookResult<()> {
        let calendar = self.get_calendar(user, title)?;
        self.store.delete_calendar(calendar.id)?;
        info!(user, calendar = calendar.id, "calendar deleted");
        Ok(())
    }

    // Schedules

    /// Run a schedule listing: resolve calendars and the date window, fetch
    /// overlapping schedules, order them, then page and shape the result.
    pub fn query_schedules(
        &self,
        user: UserId,
        query: &ScheduleQuery,
    ) -> DaybookResult<Page<ScheduleView>> {
        let reference = parse_reference_date(query.start_date.as_deref())?;
        let view_mode = ViewMode::from_param(present(query.view.as_deref()))?;
        let request = PageRequest::from_params(
            present(query.page.as_deref()),
            present(query.page_size.as_deref()),
            &self.pagination,
        )?;
        if let Some(request) = &request {
            request.check_size(&self.pagination)?;
        }

        let calendars = self.store.list_calendars(user)?;
        let scope = resolve_calendar_ids(user, &calendars, &query.calendars);
        let range = DateRange::resolve(reference, view_mode)?;
        let filter = ScheduleFilter::new(user, range, scope);

        let mut schedules = self.store.find_schedules(&filter)?;
        order_schedules(&mut schedules);
        debug!(user, %view_mode, matched = schedules.len(), "schedule query");

        let page = match request {
            Some(request) => paginate(schedules, request, &self.pagination)?,
            None => Page::whole(schedules),
        };

        Ok(page.map_items(|items| assemble(items, &calendars)))
    }

    pub fn create_schedule(&self, user: UserId, input: ScheduleInput) -> DaybookResult<ScheduleView> {
        let new = input.into_new_schedule()?;
        let calendar = self.owned_calendar(user, new.calendar_id)?;

        let schedule = self.store.create_schedule(new)?;
        info!(user, schedule = schedule.id, "schedule created");
        Ok(view(schedule, &calendar))
    }

    pub fn get_schedule(&self, user: UserId, id: ScheduleId) -> DaybookResult<ScheduleView> {
        let (schedule, calendar) = self.owned_schedule(user, id)?;
        Ok(view(schedule, &calendar))
    }

    /// Replace every field of schedule `id`. It may move to another of the user's calendars.
    pub fn update_schedule(
        &self,
        user: UserId,
        id: ScheduleId,
        input: ScheduleInput,
    ) -> DaybookResult<ScheduleView> {
        self.owned_schedule(user, id)?;
        let new = input.into_new_schedule()?;
        let calendar = self.owned_calendar(user, new.calendar_id)?;

        let schedule = self.store.update_schedule(id, new)?;
        info!(user, schedule = id, "schedule updated");
        Ok(view(schedule, &calendar))
    }

    pub fn delete_schedule(&self, user: UserId, id: ScheduleId) -> DaybookResult<()> {
        self.owned_schedule(user, id)?;
        self.store.delete_schedule(id)?;
        info!(user, schedule = id, "schedule deleted");
        Ok(())
    }

    fn owned_calendar(&self, user: UserId, id: CalendarId) -> DaybookResult<Calendar> {
        self.store
            .get_calendar(id)?
            .filter(|c| c.owner == user)
            .ok_or_else(|| DaybookError::CalendarNotFound(id.to_string()))
    }

    fn owned_schedule(&self, user: UserId, id: ScheduleId) -> DaybookResult<(Schedule, Calendar)> {
        let schedule = self
            .store
            .get_schedule(id)?
            .ok_or(DaybookError::ScheduleNotFound(id))?;
        let calendar = self
            .store
            .get_calendar(schedule.calendar_id)?
            .filter(|c| c.owner == user)
            .ok_or(DaybookError::ScheduleNotFound(id))?;
        Ok((schedule, calendar))
    }
}
