//! Mapping of handler failures onto HTTP responses
//!
//! Every error body is `{"error": "<message>"}`. Internal failures carry a
//! fixed message; the underlying cause is logged, never returned.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error returned by route handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// A required query parameter was missing or blank (400)
    BadRequest(String),
    /// Something failed server-side (500)
    Internal(&'static str),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(message) => message.as_str(),
            Self::Internal(message) => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}
