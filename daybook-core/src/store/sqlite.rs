//! SQLite-backed store.
//!
//! # Invariants
//! - Foreign keys are enforced; deleting a calendar cascades to its schedules
//!   and their participant links.
//! - Schema version is mirrored to `PRAGMA user_version` and only moves forward.
//! - Dates are stored as `YYYY-MM-DD` text for reading back, and as day
//!   numbers (`first_day`, `last_day`) for range predicates and ordering.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

use super::Store;
use crate::calendar_filter::CalendarScope;
use crate::error::{DaybookError, DaybookResult};
use crate::model::{Calendar, CalendarId, NewSchedule, Schedule, ScheduleId, User, UserId};
use crate::query::ScheduleFilter;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("migrations/0001_init.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("migrations/0002_day_numbers.sql"),
    },
];

const SCHEDULE_COLUMNS: &str = "s.id, s.calendar_id, s.title, s.start_date, s.start_time, \
     s.end_date, s.end_time, s.is_repeat, s.memo_id";

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and migrate it.
    pub fn open(path: &Path) -> DaybookResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                DaybookError::Storage(format!("Could not create {}: {e}", parent.display()))
            })?;
        }

        info!(path = %path.display(), "opening database");
        Self::from_connection(Connection::open(path)?)
    }

    /// Transient database, discarded when the store is dropped.
    pub fn open_in_memory() -> DaybookResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> DaybookResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        apply_migrations(&mut conn)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }
}

fn apply_migrations(conn: &mut Connection) -> DaybookResult<()> {
    let current = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    let latest = latest_version();

    if current > latest {
        return Err(DaybookError::Storage(format!(
            "database schema version {current} is newer than supported version {latest}"
        )));
    }

    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        debug!(version = migration.version, "applying migration");
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

/// Day number stored in `first_day` / `last_day`.
fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn calendar_from_row(row: &Row<'_>) -> rusqlite::Result<Calendar> {
    Ok(Calendar {
        id: row.get(0)?,
        owner: row.get(1)?,
        title: row.get(2)?,
    })
}

fn schedule_from_row(row: &Row<'_>) -> rusqlite::Result<Schedule> {
    Ok(Schedule {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        title: row.get(2)?,
        start_date: row.get(3)?,
        start_time: row.get(4)?,
        end_date: row.get(5)?,
        end_time: row.get(6)?,
        is_repeat: row.get(7)?,
        memo: row.get(8)?,
        participants: Vec::new(),
    })
}

fn exists(conn: &Connection, sql: &str, id: i64) -> DaybookResult<bool> {
    Ok(conn.query_row(sql, [id], |row| row.get::<_, bool>(0))?)
}

fn load_calendar(conn: &Connection, id: CalendarId) -> DaybookResult<Option<Calendar>> {
    Ok(conn
        .query_row(
            "SELECT id, user_id, title FROM calendars WHERE id = ?1;",
            [id],
            calendar_from_row,
        )
        .optional()?)
}

fn load_participants(conn: &Connection, schedule: &mut Schedule) -> DaybookResult<()> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id FROM schedule_participants WHERE schedule_id = ?1 ORDER BY user_id;",
    )?;
    schedule.participants = stmt
        .query_map([schedule.id], |row| row.get(0))?
        .collect::<Result<Vec<UserId>, _>>()?;
    Ok(())
}

fn load_schedule(conn: &Connection, id: ScheduleId) -> DaybookResult<Option<Schedule>> {
    let sql = format!("SELECT {SCHEDULE_COLUMNS} FROM schedules s WHERE s.id = ?1;");
    let Some(mut schedule) = conn.query_row(&sql, [id], schedule_from_row).optional()? else {
        return Ok(None);
    };
    load_participants(conn, &mut schedule)?;
    Ok(Some(schedule))
}

/// Reference checks shared by insert and update. Returns the normalized participant list.
fn check_schedule(
    conn: &Connection,
    new: &NewSchedule,
    id: Option<ScheduleId>,
) -> DaybookResult<Vec<UserId>> {
    if !exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM calendars WHERE id = ?1);",
        new.calendar_id,
    )? {
        return Err(DaybookError::CalendarNotFound(new.calendar_id.to_string()));
    }

    let mut participants = new.participants.clone();
    participants.sort_unstable();
    participants.dedup();
    for user in &participants {
        if !exists(conn, "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);", *user)? {
            return Err(DaybookError::UserNotFound(*user));
        }
    }

    if let Some(memo) = new.memo {
        let holder: Option<ScheduleId> = conn
            .query_row(
                "SELECT id FROM schedules WHERE memo_id = ?1 AND id IS NOT ?2;",
                params![memo, id],
                |row| row.get(0),
            )
            .optional()?;
        if holder.is_some() {
            return Err(DaybookError::MemoAlreadyAttached(memo));
        }
    }

    Ok(participants)
}

fn replace_participants(conn: &Connection, id: ScheduleId, users: &[UserId]) -> DaybookResult<()> {
    conn.execute(
        "DELETE FROM schedule_participants WHERE schedule_id = ?1;",
        [id],
    )?;
    let mut stmt = conn.prepare_cached(
        "INSERT INTO schedule_participants (schedule_id, user_id) VALUES (?1, ?2);",
    )?;
    for user in users {
        stmt.execute([id, *user])?;
    }
    Ok(())
}

impl Store for SqliteStore {
    fn create_user(&self, email: &str, nickname: Option<&str>) -> DaybookResult<User> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (email, nickname) VALUES (?1, ?2);",
            params![email, nickname],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                DaybookError::DuplicateEmail(email.to_string())
            } else {
                e.into()
            }
        })?;

        Ok(User {
            id: conn.last_insert_rowid(),
            email: email.to_string(),
            nickname: nickname.map(str::to_string),
        })
    }

    fn get_user(&self, id: UserId) -> DaybookResult<Option<User>> {
        let conn = self.conn.lock();
        Ok(conn
            .query_row(
                "SELECT id, email, nickname FROM users WHERE id = ?1;",
                [id],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                        nickname: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    fn list_calendars(&self, owner: UserId) -> DaybookResult<Vec<Calendar>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT id, user_id, title FROM calendars WHERE user_id = ?1 ORDER BY id;")?;
        let calendars = stmt
            .query_map([owner], calendar_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(calendars)
    }

    fn get_calendar(&self, id: CalendarId) -> DaybookResult<Option<Calendar>> {
        load_calendar(&self.conn.lock(), id)
    }

    fn find_calendar(&self, owner: UserId, title: &str) -> DaybookResult<Option<Calendar>> {
        let conn = self.conn.lock();
        Ok(conn
            .query_row(
                "SELECT id, user_id, title FROM calendars WHERE user_id = ?1 AND title = ?2;",
                params![owner, title],
                calendar_from_row,
            )
            .optional()?)
    }

    fn create_calendar(&self, owner: UserId, title: &str) -> DaybookResult<Calendar> {
        let conn = self.conn.lock();
        if !exists(&conn, "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);", owner)? {
            return Err(DaybookError::UserNotFound(owner));
        }

        conn.execute(
            "INSERT INTO calendars (user_id, title) VALUES (?1, ?2);",
            params![owner, title],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                DaybookError::DuplicateCalendarTitle(title.to_string())
            } else {
                e.into()
            }
        })?;

        Ok(Calendar {
            id: conn.last_insert_rowid(),
            owner,
            title: title.to_string(),
        })
    }

    fn rename_calendar(&self, id: CalendarId, title: &str) -> DaybookResult<Calendar> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE calendars SET title = ?2 WHERE id = ?1;",
                params![id, title],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DaybookError::DuplicateCalendarTitle(title.to_string())
                } else {
                    e.into()
                }
            })?;

        if changed == 0 {
            return Err(DaybookError::CalendarNotFound(id.to_string()));
        }

        load_calendar(&conn, id)?.ok_or_else(|| DaybookError::CalendarNotFound(id.to_string()))
    }

    fn delete_calendar(&self, id: CalendarId) -> DaybookResult<()> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM calendars WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(DaybookError::CalendarNotFound(id.to_string()));
        }
        Ok(())
    }

    fn create_schedule(&self, new: NewSchedule) -> DaybookResult<Schedule> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let participants = check_schedule(&tx, &new, None)?;
        tx.execute(
            "INSERT INTO schedules
                (calendar_id, memo_id, title, start_date, start_time, end_date, end_time,
                 is_repeat, first_day, last_day)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                new.calendar_id,
                new.memo,
                new.title,
                new.start_date,
                new.start_time,
                new.end_date,
                new.end_time,
                new.is_repeat,
                day_number(new.start_date),
                day_number(new.end_date.unwrap_or(new.start_date)),
            ],
        )?;
        let id = tx.last_insert_rowid();
        replace_participants(&tx, id, &participants)?;
        tx.commit()?;

        let mut schedule = new.into_schedule(id);
        schedule.participants = participants;
        Ok(schedule)
    }

    fn get_schedule(&self, id: ScheduleId) -> DaybookResult<Option<Schedule>> {
        load_schedule(&self.conn.lock(), id)
    }

    fn update_schedule(&self, id: ScheduleId, new: NewSchedule) -> DaybookResult<Schedule> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT EXISTS(SELECT 1 FROM schedules WHERE id = ?1);", id)? {
            return Err(DaybookError::ScheduleNotFound(id));
        }

        let participants = check_schedule(&tx, &new, Some(id))?;
        tx.execute(
            "UPDATE schedules
             SET calendar_id = ?2,
                 memo_id = ?3,
                 title = ?4,
                 start_date = ?5,
                 start_time = ?6,
                 end_date = ?7,
                 end_time = ?8,
                 is_repeat = ?9,
                 first_day = ?10,
                 last_day = ?11
             WHERE id = ?1;",
            params![
                id,
                new.calendar_id,
                new.memo,
                new.title,
                new.start_date,
                new.start_time,
                new.end_date,
                new.end_time,
                new.is_repeat,
                day_number(new.start_date),
                day_number(new.end_date.unwrap_or(new.start_date)),
            ],
        )?;
        replace_participants(&tx, id, &participants)?;
        tx.commit()?;

        let mut schedule = new.into_schedule(id);
        schedule.participants = participants;
        Ok(schedule)
    }

    fn delete_schedule(&self, id: ScheduleId) -> DaybookResult<()> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM schedules WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(DaybookError::ScheduleNotFound(id));
        }
        Ok(())
    }

    fn find_schedules(&self, filter: &ScheduleFilter) -> DaybookResult<Vec<Schedule>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            "SELECT {SCHEDULE_COLUMNS}
             FROM schedules s
             JOIN calendars c ON c.id = s.calendar_id
             WHERE c.user_id = ?1
               AND s.first_day <= ?2
               AND s.last_day >= ?3"
        );
        let mut values = vec![
            Value::Integer(filter.owner),
            Value::Integer(day_number(filter.range.end)),
            Value::Integer(day_number(filter.range.start)),
        ];

        if let CalendarScope::Only(ids) = &filter.calendars {
            let placeholders = (0..ids.len())
                .map(|i| format!("?{}", values.len() + i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" AND s.calendar_id IN ({placeholders})"));
            values.extend(ids.iter().map(|id| Value::Integer(*id)));
        }
        sql.push_str(" ORDER BY s.first_day, s.start_time, s.id;");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let mut schedules = stmt
            .query_map(params_from_iter(values.iter()), schedule_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        for schedule in &mut schedules {
            load_participants(&conn, schedule)?;
        }

        debug!(count = schedules.len(), "schedules matched");
        Ok(schedules)
    }
}
