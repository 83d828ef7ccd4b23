//! JSON error responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::error;

use crate::server::validation::FieldError;
use crate::PrecisError;

/// An HTTP error with a JSON body
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    /// 400 with per-field messages
    pub fn validation(details: Vec<FieldError>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": "Validation failed", "details": details }),
        )
    }

    pub fn bad_request(error: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, json!({ "error": error }))
    }

    pub fn summary_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, json!({ "error": "Summary not found" }))
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, json!({ "error": "Route not found" }))
    }

    /// 500 naming the failed action, with the underlying message
    pub fn internal(action: &str, err: impl std::fmt::Display) -> Self {
        error!("{}: {}", action, err);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": action, "message": err.to_string() }),
        )
    }

    /// Map a library error for the given action
    pub fn from_error(action: &str, err: PrecisError) -> Self {
        match err {
            PrecisError::NotFound(_) => Self::summary_not_found(),
            PrecisError::Validation(message) => Self::validation(vec![FieldError::new("body", message)]),
            PrecisError::Mail(e) if e.is_configuration() => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "error": "Email service unavailable",
                    "message": "Email sharing is not configured. Please contact the administrator.",
                    "details": e.to_string(),
                }),
            ),
            other => Self::internal(action, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
