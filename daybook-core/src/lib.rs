//! Core of the daybook ecosystem.
//!
//! This crate is shared by the daybook CLI and daybook-server:
//! - the calendar/schedule model and its [`store`] implementations
//! - the schedule query engine: [`date_range`] resolution, [`calendar_filter`],
//!   [`query`] planning, [`pagination`] and result assembly ([`assemble`])
//! - the [`Daybook`] service facade, configuration and logging setup

pub mod assemble;
pub mod calendar_filter;
pub mod config;
pub mod date_range;
pub mod error;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod query;
pub mod service;
pub mod store;

pub use assemble::{CalendarRef, ScheduleView};
pub use crate::config::DaybookConfig;
pub use date_range::{DateRange, ViewMode};
pub use error::{DaybookError, DaybookResult, ErrorKind};
pub use model::{Calendar, CalendarId, MemoId, Schedule, ScheduleId, User, UserId};
pub use pagination::{Page, PaginationConfig};
pub use service::{Daybook, ScheduleInput, ScheduleQuery};
pub use store::{MemoryStore, SqliteStore, Store};
