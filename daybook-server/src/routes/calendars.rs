//! Calendar endpoints

use axum::{Router, extract::State, http::StatusCode, routing::get};
use daybook_core::{Calendar, CalendarId};
use serde::{Deserialize, Serialize};

use crate::routes::extract::{Json, Path};
use crate::routes::{AppError, Requester};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendars/", get(list_calendars).post(create_calendar))
        .route(
            "/calendars/name/{title}/",
            get(get_calendar).put(rename_calendar).delete(delete_calendar),
        )
}

/// Calendar info returned by API
#[derive(Serialize)]
pub struct CalendarInfo {
    pub id: CalendarId,
    pub title: String,
}

impl From<Calendar> for CalendarInfo {
    fn from(calendar: Calendar) -> Self {
        CalendarInfo {
            id: calendar.id,
            title: calendar.title,
        }
    }
}

/// Request body for creating or renaming a calendar
#[derive(Deserialize)]
pub struct CalendarPayload {
    pub title: Option<String>,
}

/// GET /calendars/ - List the requester's calendars
async fn list_calendars(
    State(state): State<AppState>,
    Requester(user): Requester,
) -> Result<Json<Vec<CalendarInfo>>, AppError> {
    let calendars = state
        .daybook()
        .list_calendars(user)?
        .into_iter()
        .map(CalendarInfo::from)
        .collect();

    Ok(Json(calendars))
}

/// POST /calendars/ - Create a calendar
async fn create_calendar(
    State(state): State<AppState>,
    Requester(user): Requester,
    Json(req): Json<CalendarPayload>,
) -> Result<(StatusCode, Json<CalendarInfo>), AppError> {
    let calendar = state.daybook().create_calendar(user, req.title.as_deref())?;
    Ok((StatusCode::CREATED, Json(calendar.into())))
}

/// GET /calendars/name/:title/ - Look up a calendar by title
async fn get_calendar(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(title): Path<String>,
) -> Result<Json<CalendarInfo>, AppError> {
    let calendar = state.daybook().get_calendar(user, &title)?;
    Ok(Json(calendar.into()))
}

/// PUT /calendars/name/:title/ - Rename a calendar
async fn rename_calendar(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(title): Path<String>,
    Json(req): Json<CalendarPayload>,
) -> Result<Json<CalendarInfo>, AppError> {
    let calendar = state
        .daybook()
        .rename_calendar(user, &title, req.title.as_deref())?;
    Ok(Json(calendar.into()))
}

/// DELETE /calendars/name/:title/ - Delete a calendar and its schedules
async fn delete_calendar(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(title): Path<String>,
) -> Result<StatusCode, AppError> {
    state.daybook().delete_calendar(user, &title)?;
    Ok(StatusCode::NO_CONTENT)
}
