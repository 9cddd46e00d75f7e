use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::application::error::HttpError;

use super::HttpState;

pub(super) async fn sitemap(State(state): State<HttpState>) -> Response {
    match state.sitemap.sitemap_xml().await {
        Ok(body) => text_response(body, "application/xml"),
        Err(err) => HttpError::from_error(
            "infra::http::site::sitemap",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to generate sitemap",
            &err,
        )
        .into_response(),
    }
}

pub(super) async fn robots_txt(State(state): State<HttpState>) -> Response {
    text_response(state.sitemap.robots_txt(), "text/plain; charset=utf-8")
}

pub(super) async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

fn text_response(body: String, content_type: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
