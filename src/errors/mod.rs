//! The proxy's error taxonomy (spec §7) and its SCIM wire mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ScimError;

pub type ProxyResult<T> = Result<T, ProxyError>;

/// All errors the core and web layers can produce, matched 1:1 against
/// the original implementation's exception hierarchy
/// (`examples/original_source/app/utils/exceptions.py`), which pins the
/// exact `(status, scimType)` pairs below.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("filter evaluation failed: {0}")]
    FilterEvaluation(String),

    /// Upstream transport failure or non-2xx response. `status` is the
    /// HTTP status to report to the client: the upstream's own status
    /// when meaningful (e.g. 404), otherwise a 502-class fallback.
    #[error("upstream error: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    #[error("too many requests: {0}")]
    TooManyRequests(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ProxyError {
    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        ProxyError::Upstream {
            status,
            message: message.into(),
        }
    }

    fn status_and_scim_type(&self) -> (StatusCode, Option<&'static str>) {
        match self {
            ProxyError::InvalidFilter(_) => (StatusCode::BAD_REQUEST, Some("invalidFilter")),
            ProxyError::FilterEvaluation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some("filterEvaluation"))
            }
            ProxyError::Upstream { status, .. } => (*status, Some("upstream")),
            ProxyError::InvalidPatch(_) => (StatusCode::BAD_REQUEST, Some("invalidPatch")),
            ProxyError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, Some("resourceNotFound")),
            ProxyError::TooManyRequests(_) => {
                (StatusCode::TOO_MANY_REQUESTS, Some("tooManyRequests"))
            }
            ProxyError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, scim_type) = self.status_and_scim_type();
        let body = ScimError::new(status.as_u16(), scim_type, self.to_string());
        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        let status = err
            .status()
            .map(|s| StatusCode::from_u16(s.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY))
            .unwrap_or(StatusCode::BAD_GATEWAY);
        ProxyError::Upstream {
            status,
            message: err.to_string(),
        }
    }
}
