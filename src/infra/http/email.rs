//! Email dispatch and contact form handlers.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use folio_api_types::{ContactRequest, EmailRequest, SendAck, SendFailure};

use crate::application::contact::{ContactError, ContactService};
use crate::application::error::ErrorReport;

use super::HttpState;

const SEND_FAILED: &str = "Failed to send email";

pub(super) async fn send_email(
    State(state): State<HttpState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body("infra::http::email::send", &rejection),
    };
    let Some(contact) = configured(&state) else {
        return unconfigured("infra::http::email::send");
    };

    match contact.dispatch(&request).await {
        Ok(()) => sent(),
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            SEND_FAILED,
            ErrorReport::from_error(
                "infra::http::email::send",
                StatusCode::INTERNAL_SERVER_ERROR,
                &err,
            ),
        ),
    }
}

pub(super) async fn submit_contact(
    State(state): State<HttpState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body("infra::http::email::contact", &rejection),
    };
    let Some(contact) = configured(&state) else {
        return unconfigured("infra::http::email::contact");
    };

    match contact.submit(&request).await {
        Ok(()) => sent(),
        Err(ContactError::Validation(message)) => failure(
            StatusCode::BAD_REQUEST,
            &message,
            ErrorReport::from_message(
                "infra::http::email::contact",
                StatusCode::BAD_REQUEST,
                message.clone(),
            ),
        ),
        Err(err) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            SEND_FAILED,
            ErrorReport::from_error(
                "infra::http::email::contact",
                StatusCode::INTERNAL_SERVER_ERROR,
                &err,
            ),
        ),
    }
}

fn configured(state: &HttpState) -> Option<&ContactService> {
    state.contact.as_ref()
}

fn sent() -> Response {
    Json(SendAck { success: true }).into_response()
}

fn failure(status: StatusCode, message: &str, report: ErrorReport) -> Response {
    let mut response = (
        status,
        Json(SendFailure {
            error: message.to_string(),
        }),
    )
        .into_response();
    report.attach(&mut response);
    response
}

fn invalid_body(source: &'static str, rejection: &JsonRejection) -> Response {
    failure(
        StatusCode::BAD_REQUEST,
        "Invalid request body",
        ErrorReport::from_error(source, StatusCode::BAD_REQUEST, rejection),
    )
}

fn unconfigured(source: &'static str) -> Response {
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        SEND_FAILED,
        ErrorReport::from_message(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "email provider is not configured",
        ),
    )
}
