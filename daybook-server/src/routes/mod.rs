pub mod calendars;
pub mod extract;
pub mod schedules;

use axum::{
    Json, Router,
    extract::{
        FromRequestParts,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use daybook_core::{DaybookError, ErrorKind, UserId};
use serde::Serialize;

use crate::state::AppState;

/// Header carrying the authenticated user id, set by the fronting auth layer.
pub const USER_HEADER: &str = "x-user-id";

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(calendars::router())
        .merge(schedules::router())
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Convert errors to HTTP responses
pub enum AppError {
    Unauthorized(&'static str),
    /// The request could not be read: bad path, query string or body.
    Malformed(String),
    Daybook(DaybookError),
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            AppError::Malformed(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Daybook(err) => (status_for(err.kind()), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!(%status, %message, "request failed");
        } else {
            tracing::warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<DaybookError> for AppError {
    fn from(err: DaybookError) -> Self {
        Self::Daybook(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Malformed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed(rejection.to_string())
    }
}

/// The user a request is made on behalf of.
pub struct Requester(pub UserId);

impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<UserId>().ok())
            .ok_or(AppError::Unauthorized("missing or invalid X-User-Id header"))?;

        match state.daybook().user(id) {
            Ok(_) => Ok(Requester(id)),
            Err(DaybookError::UserNotFound(_)) => Err(AppError::Unauthorized("unknown user")),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use daybook_core::{Daybook, MemoryStore, PaginationConfig, UserId};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{USER_HEADER, router};
    use crate::state::AppState;

    pub struct TestApp {
        pub daybook: Daybook,
        pub app: Router,
        pub user: UserId,
        pub other: UserId,
    }

    pub fn test_app() -> TestApp {
        let daybook = Daybook::new(Arc::new(MemoryStore::new()), PaginationConfig::default());
        let user = daybook.create_user("tester@test.com", None).unwrap().id;
        let other = daybook.create_user("other@test.com", None).unwrap().id;
        let app = router(AppState::new(daybook.clone()));
        TestApp {
            daybook,
            app,
            user,
            other,
        }
    }

    impl TestApp {
        pub async fn send(
            &self,
            method: &str,
            uri: &str,
            user: Option<UserId>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            self.send_raw(method, uri, user, body.map(|json| json.to_string()))
                .await
        }

        /// Like [`send`](Self::send), with the JSON body given verbatim.
        pub async fn send_raw(
            &self,
            method: &str,
            uri: &str,
            user: Option<UserId>,
            body: Option<String>,
        ) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(user) = user {
                builder = builder.header(USER_HEADER, user.to_string());
            }
            let body = match body {
                Some(text) => {
                    builder = builder.header(header::CONTENT_TYPE, "application/json");
                    Body::from(text)
                }
                None => Body::empty(),
            };

            let response = self
                .app
                .clone()
                .oneshot(builder.body(body).expect("request"))
                .await
                .expect("response");

            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body bytes");
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("json body")
            };
            (status, json)
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send("GET", uri, Some(self.user), None).await
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::test_support::test_app;

    #[tokio::test]
    async fn requests_without_identity_are_unauthorized() {
        let t = test_app();

        let (status, body) = t.send("GET", "/calendars/", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["message"].is_string());

        let (status, _) = t.send("GET", "/calendars/", Some(9999), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
