//! HTTP route handlers

pub mod share;
pub mod summarize;

use axum::Json;
use serde_json::{json, Value};

use crate::server::error::ApiError;

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

/// Anything unmatched
pub async fn not_found() -> ApiError {
    ApiError::route_not_found()
}
