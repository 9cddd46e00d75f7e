use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use folio_api_types::{ApiErrorBody, ApiErrorMessage};

use crate::application::error::{ContentError, ErrorReport};

pub mod codes {
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const FETCH_FAILED: &str = "fetch_failed";
    pub const CONFIG: &str = "config_error";
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ContentError> for ApiError {
    fn from(error: ContentError) -> Self {
        match error {
            ContentError::Validation(detail) => Self::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_INPUT,
                "Invalid query",
                Some(detail),
            ),
            ContentError::Fetch { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                codes::FETCH_FAILED,
                "Content backend unavailable",
                Some(error.to_string()),
            ),
            ContentError::Config(detail) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::CONFIG,
                "Content backend misconfigured",
                Some(detail),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let hint = self.hint.clone();
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {}", self.code, hint.as_deref().unwrap_or(self.message)),
        )
        .attach(&mut response);
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_map_to_bad_gateway() {
        let error = ApiError::from(ContentError::fetch(Some(503), "busy"));
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.code, codes::FETCH_FAILED);
    }

    #[test]
    fn validation_failures_keep_detail_as_hint() {
        let error = ApiError::from(ContentError::validation("limit must be positive"));
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.hint.as_deref(), Some("limit must be positive"));

        let response = error.into_response();
        let report = response.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.messages, ["invalid_input: limit must be positive"]);
    }
}
