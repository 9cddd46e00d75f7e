//! Request id propagation and per-response logging.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const LOG_TARGET: &str = "folio::http::response";
const MAX_FORWARDED_ID_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
}

impl RequestContext {
    /// Keep an id forwarded by a fronting proxy when it is a short token,
    /// otherwise mint a fresh one.
    fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| is_forwardable(id))
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self { request_id }
    }
}

fn is_forwardable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_FORWARDED_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext::from_headers(request.headers());
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let request_id = request
        .extensions()
        .get::<RequestContext>()
        .map(|ctx| ctx.request_id.clone())
        .unwrap_or_default();
    let started = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis();

    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        if response.status().is_server_error() {
            error!(target: LOG_TARGET, status, %method, path = uri.path(), elapsed_ms, request_id, "request failed without report");
        } else {
            debug!(target: LOG_TARGET, status, %method, path = uri.path(), elapsed_ms, request_id, "request served");
        }
        return response;
    };

    let detail = report
        .messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");
    let query = uri.query().unwrap_or_default();

    if response.status().is_server_error() {
        error!(
            target: LOG_TARGET,
            status,
            %method,
            path = uri.path(),
            query,
            elapsed_ms,
            source = report.source,
            detail,
            chain = ?report.messages,
            request_id,
            "request failed",
        );
    } else {
        warn!(
            target: LOG_TARGET,
            status,
            %method,
            path = uri.path(),
            query,
            elapsed_ms,
            source = report.source,
            detail,
            request_id,
            "request rejected",
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).expect("header"));
        headers
    }

    #[test]
    fn forwarded_ids_are_kept() {
        let ctx = RequestContext::from_headers(&headers_with("edge-7f3a.1"));
        assert_eq!(ctx.request_id, "edge-7f3a.1");
    }

    #[test]
    fn unusable_ids_are_replaced() {
        for id in ["", "has space", "semi;colon", &"x".repeat(200)] {
            let ctx = RequestContext::from_headers(&headers_with(id));
            assert_ne!(ctx.request_id, id);
            assert!(Uuid::parse_str(&ctx.request_id).is_ok(), "{id:?}");
        }

        let ctx = RequestContext::from_headers(&HeaderMap::new());
        assert!(Uuid::parse_str(&ctx.request_id).is_ok());
    }
}
