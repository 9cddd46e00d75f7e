use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{domain::slug::SlugError, infra::error::InfraError};

/// Diagnostic chain attached to error responses for the logging middleware.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn from_message(
        source: &'static str,
        status: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            status,
            messages: vec![message.into()],
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// Plain-text error response for non-JSON routes.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        let report = ErrorReport::from_error(source, status, error);
        Self {
            status,
            public_message,
            report,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

/// Failures of the content-retrieval layer.
///
/// A lookup that matches nothing is not an error; it is reported as `Ok(None)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentError {
    /// Malformed caller input, rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),
    /// Transport failure or non-success response from a backend.
    #[error("{}", describe_fetch(.status, .message))]
    Fetch {
        status: Option<u16>,
        message: Option<String>,
    },
    /// Missing or invalid backend credentials.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ContentError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Fetch {
            status,
            message: Some(message.into()),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Fetch { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<SlugError> for ContentError {
    fn from(error: SlugError) -> Self {
        Self::Validation(error.to_string())
    }
}

fn describe_fetch(status: &Option<u16>, message: &Option<String>) -> String {
    match (status, message.as_deref()) {
        (Some(status), Some(message)) => format!("content fetch failed with status {status}: {message}"),
        (Some(status), None) => format!("content fetch failed with status {status}"),
        (None, Some(message)) => format!("content fetch failed: {message}"),
        (None, None) => "content fetch failed".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("resource not found")]
    NotFound,
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display_includes_status_and_message() {
        let error = ContentError::fetch(Some(503), "upstream busy");
        assert_eq!(
            error.to_string(),
            "content fetch failed with status 503: upstream busy"
        );
        assert_eq!(error.status(), Some(503));
    }

    #[test]
    fn slug_errors_become_validation_errors() {
        let error: ContentError = SlugError::Missing.into();
        assert!(matches!(error, ContentError::Validation(_)));
    }
}
