//! Error types for the daybook ecosystem.

use thiserror::Error;

/// Errors that can occur in daybook operations.
#[derive(Error, Debug)]
pub enum DaybookError {
    #[error("Missing required parameter: {0}")]
    MissingRequiredParameter(&'static str),

    #[error("Invalid date '{0}'. Expected an ISO-8601 date (YYYY-MM-DD) or date-time")]
    InvalidDateFormat(String),

    #[error("Invalid time '{0}'. Expected HH:MM or HH:MM:SS")]
    InvalidTimeFormat(String),

    #[error("Invalid view '{0}'. Expected one of: daily, weekly, monthly")]
    InvalidViewMode(String),

    #[error("Invalid page size '{0}'")]
    InvalidPageSize(String),

    #[error("Invalid page '{0}'")]
    PageNotFound(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Schedule not found: {0}")]
    ScheduleNotFound(i64),

    #[error("User not found: {0}")]
    UserNotFound(i64),

    #[error("A calendar titled '{0}' already exists")]
    DuplicateCalendarTitle(String),

    #[error("A user with email '{0}' already exists")]
    DuplicateEmail(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(String),

    #[error("Schedule ends before it starts")]
    InvalidScheduleSpan,

    #[error("Memo {0} is already attached to another schedule")]
    MemoAlreadyAttached(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Broad classification used when surfacing errors to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

impl DaybookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DaybookError::MissingRequiredParameter(_)
            | DaybookError::InvalidDateFormat(_)
            | DaybookError::InvalidTimeFormat(_)
            | DaybookError::InvalidViewMode(_)
            | DaybookError::InvalidPageSize(_)
            | DaybookError::DuplicateCalendarTitle(_)
            | DaybookError::DuplicateEmail(_)
            | DaybookError::InvalidTitle(_)
            | DaybookError::InvalidScheduleSpan
            | DaybookError::MemoAlreadyAttached(_)
            | DaybookError::UserNotFound(_) => ErrorKind::BadRequest,

            DaybookError::PageNotFound(_)
            | DaybookError::CalendarNotFound(_)
            | DaybookError::ScheduleNotFound(_) => ErrorKind::NotFound,

            DaybookError::Config(_) | DaybookError::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl From<rusqlite::Error> for DaybookError {
    fn from(err: rusqlite::Error) -> Self {
        DaybookError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for DaybookError {
    fn from(err: config::ConfigError) -> Self {
        DaybookError::Config(err.to_string())
    }
}

/// Result type alias for daybook operations.
pub type DaybookResult<T> = Result<T, DaybookError>;
