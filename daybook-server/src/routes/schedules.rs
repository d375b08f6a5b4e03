//! Schedule endpoints

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use daybook_core::{ScheduleId, ScheduleInput, ScheduleQuery, ScheduleView};

use crate::routes::extract::{Json, Path, Query};
use crate::routes::{AppError, Requester};
use crate::state::AppState;

pub const TOTAL_COUNT_HEADER: &str = "x-total-count";
pub const PAGE_COUNT_HEADER: &str = "x-page-count";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendars/schedule/", get(list_schedules).post(create_schedule))
        .route(
            "/calendars/schedule/{id}/",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
}

/// GET /calendars/schedule/ - Schedules overlapping the window around `start_date`
///
/// Query: `start_date` (required), `view`, repeated `calendar[]`, `page`, `page_size`.
/// Paging totals are returned in headers; the body is the page's schedules.
async fn list_schedules(
    State(state): State<AppState>,
    Requester(user): Requester,
    Query(query): Query<ScheduleQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.daybook().query_schedules(user, &query)?;

    let headers = [
        (TOTAL_COUNT_HEADER, page.total_items.to_string()),
        (PAGE_COUNT_HEADER, page.total_pages.to_string()),
    ];
    Ok((headers, Json(page.items)))
}

/// POST /calendars/schedule/ - Create a schedule
async fn create_schedule(
    State(state): State<AppState>,
    Requester(user): Requester,
    Json(req): Json<ScheduleInput>,
) -> Result<(StatusCode, Json<ScheduleView>), AppError> {
    let schedule = state.daybook().create_schedule(user, req)?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /calendars/schedule/:id/
async fn get_schedule(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<ScheduleId>,
) -> Result<Json<ScheduleView>, AppError> {
    Ok(Json(state.daybook().get_schedule(user, id)?))
}

/// PUT /calendars/schedule/:id/ - Replace a schedule
async fn update_schedule(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<ScheduleId>,
    Json(req): Json<ScheduleInput>,
) -> Result<Json<ScheduleView>, AppError> {
    Ok(Json(state.daybook().update_schedule(user, id, req)?))
}

/// DELETE /calendars/schedule/:id/
async fn delete_schedule(
    State(state): State<AppState>,
    Requester(user): Requester,
    Path(id): Path<ScheduleId>,
) -> Result<StatusCode, AppError> {
    state.daybook().delete_schedule(user, id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Days, NaiveDate};
    use daybook_core::{Calendar, ScheduleInput};
    use serde_json::{Value, json};

    use crate::routes::test_support::{TestApp, test_app};

    // Wednesday; the next day is in the same week.
    const TODAY: &str = "2024-11-06";
    const TOMORROW: &str = "2024-11-07";

    struct Seeded {
        t: TestApp,
        work: Calendar,
    }

    fn schedule(calendar: &Calendar, title: &str, start: &str, end: &str) -> ScheduleInput {
        ScheduleInput {
            calendar: Some(calendar.id),
            title: Some(title.to_string()),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            ..ScheduleInput::default()
        }
    }

    fn seeded() -> Seeded {
        let t = test_app();
        let work = t.daybook.create_calendar(t.user, Some("Work")).unwrap();
        let personal = t.daybook.create_calendar(t.user, Some("Personal")).unwrap();

        let mut meeting = schedule(&work, "Meeting", TODAY, TODAY);
        meeting.start_time = Some("10:00".into());
        meeting.end_time = Some("11:00".into());
        t.daybook.create_schedule(t.user, meeting).unwrap();
        t.daybook
            .create_schedule(t.user, schedule(&personal, "Gym", TOMORROW, TOMORROW))
            .unwrap();

        Seeded { t, work }
    }

    fn titles(body: &Value) -> Vec<&str> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn get_without_start_date() {
        let s = seeded();
        let (status, body) = s.t.get("/calendars/schedule/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("start_date"));
    }

    #[tokio::test]
    async fn get_with_malformed_start_date() {
        let s = seeded();
        let (status, _) = s.t.get("/calendars/schedule/?start_date=11%2F06%2F2024").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_with_unknown_view() {
        let s = seeded();
        let (status, _) = s
            .t
            .get(&format!("/calendars/schedule/?start_date={TODAY}&view=yearly"))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_with_start_date_defaults_to_daily() {
        let s = seeded();
        let (status, body) = s
            .t
            .get("/calendars/schedule/?start_date=2024-11-06T09%3A30%3A00.123456")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Meeting"]);
        assert_eq!(body[0]["calendar"]["title"], "Work");
        assert_eq!(body[0]["start_time"], "10:00:00");
    }

    #[tokio::test]
    async fn get_with_view_daily() {
        let s = seeded();
        let (status, body) = s
            .t
            .get(&format!("/calendars/schedule/?start_date={TODAY}&view=daily"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Meeting"]);
    }

    #[tokio::test]
    async fn get_with_view_weekly() {
        let s = seeded();
        let (status, body) = s
            .t
            .get(&format!("/calendars/schedule/?start_date={TODAY}&view=weekly"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Meeting", "Gym"]);
    }

    #[tokio::test]
    async fn get_with_view_monthly() {
        let s = seeded();
        let (status, body) = s
            .t
            .get(&format!("/calendars/schedule/?start_date={TODAY}&view=monthly"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn get_with_calendar_filter() {
        let s = seeded();
        let (status, body) = s
            .t
            .get(&format!(
                "/calendars/schedule/?start_date={TODAY}&view=weekly&calendar%5B%5D=Work"
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Meeting"]);

        let (status, body) = s
            .t
            .get(&format!(
                "/calendars/schedule/?start_date={TODAY}&view=weekly\
                 &calendar%5B%5D=Work&calendar%5B%5D=Personal"
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Meeting", "Gym"]);
    }

    #[tokio::test]
    async fn blank_calendar_filter_is_unrestricted() {
        let s = seeded();
        let (status, body) = s
            .t
            .get(&format!(
                "/calendars/schedule/?start_date={TODAY}&view=weekly&calendar%5B%5D="
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(titles(&body), vec!["Meeting", "Gym"]);
    }

    #[tokio::test]
    async fn other_user_sees_nothing() {
        let s = seeded();
        let (status, body) = s
            .t
            .send(
                "GET",
                &format!("/calendars/schedule/?start_date={TODAY}&view=monthly&calendar%5B%5D=Work"),
                Some(s.t.other),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }

    fn fifteen() -> Seeded {
        let t = test_app();
        let work = t.daybook.create_calendar(t.user, Some("Work")).unwrap();
        let first = NaiveDate::from_ymd_opt(2024, 11, 1).unwrap();
        for i in 0..15 {
            let day = first.checked_add_days(Days::new(i)).unwrap().to_string();
            t.daybook
                .create_schedule(t.user, schedule(&work, &format!("Meeting {i}"), &day, &day))
                .unwrap();
        }
        Seeded { t, work }
    }

    fn page_uri(page: u32, page_size: u32) -> String {
        format!(
            "/calendars/schedule/?start_date=2024-11-01&view=monthly&page={page}&page_size={page_size}"
        )
    }

    #[tokio::test]
    async fn pagination_pages() {
        let s = fifteen();

        let (status, body) = s.t.get(&page_uri(1, 10)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 10);

        let (status, body) = s.t.get(&page_uri(2, 10)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn pagination_invalid_page() {
        let s = fifteen();
        let (status, body) = s.t.get(&page_uri(3, 10)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn pagination_invalid_page_size() {
        let s = fifteen();
        let (status, _) = s.t.get(&page_uri(1, 100)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn repeated_page_is_not_found() {
        let s = fifteen();
        let (status, body) = s
            .t
            .get("/calendars/schedule/?start_date=2024-11-01&view=monthly&page=1&page=2")
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].is_string());

        let (status, body) = s
            .t
            .get("/calendars/schedule/?start_date=2024-11-01&view=monthly&page_size=5&page_size=10")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn create_schedule_without_memo() {
        let s = seeded();
        let payload = json!({
            "calendar": s.work.id,
            "title": "schedule1",
            "start_date": "9999-12-31",
        });
        let (status, body) = s
            .t
            .send("POST", "/calendars/schedule/", Some(s.t.user), Some(payload.clone()))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        for key in payload.as_object().unwrap().keys() {
            assert!(body.get(key).is_some(), "missing {key}");
        }
        assert!(body["memo"].is_null());
    }

    #[tokio::test]
    async fn create_schedule_missing_title() {
        let s = seeded();
        let (status, body) = s
            .t
            .send(
                "POST",
                "/calendars/schedule/",
                Some(s.t.user),
                Some(json!({"calendar": s.work.id, "start_date": TODAY})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("title"));
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let s = seeded();

        let (status, body) = s.t.get("/calendars/schedule/abc/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = s
            .t
            .send_raw(
                "POST",
                "/calendars/schedule/",
                Some(s.t.user),
                Some("{\"title\": ".to_string()),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = s
            .t
            .send(
                "POST",
                "/calendars/schedule/",
                Some(s.t.user),
                Some(json!({"calendar": "Work", "title": "x", "start_date": TODAY})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn expanded_year_is_rejected() {
        let s = seeded();
        let (status, body) = s
            .t
            .send(
                "POST",
                "/calendars/schedule/",
                Some(s.t.user),
                Some(json!({
                    "calendar": s.work.id,
                    "title": "far",
                    "start_date": "2024-10-01",
                    "end_date": "+10000-01-01",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("+10000-01-01"));
    }

    #[tokio::test]
    async fn schedule_detail_lifecycle() {
        let s = seeded();
        let (_, created) = s
            .t
            .send(
                "POST",
                "/calendars/schedule/",
                Some(s.t.user),
                Some(json!({"calendar": s.work.id, "title": "Standup", "start_date": TODAY, "memo": 3})),
            )
            .await;
        let uri = format!("/calendars/schedule/{}/", created["id"]);

        let (status, body) = s.t.get(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["memo"], 3);

        let (status, _) = s.t.send("GET", &uri, Some(s.t.other), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = s
            .t
            .send(
                "PUT",
                &uri,
                Some(s.t.user),
                Some(json!({"calendar": s.work.id, "title": "Retro", "start_date": TOMORROW})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Retro");
        assert_eq!(body["start_date"], TOMORROW);

        let (status, _) = s.t.send("DELETE", &uri, Some(s.t.user), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = s.t.get(&uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
