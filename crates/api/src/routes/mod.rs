//! API route definitions.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;

use crate::AppState;

pub mod files;
pub mod health;
pub mod integrations;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(integrations::routes())
        .merge(files::routes())
}

/// JSON error body used by every route.
pub(crate) fn error_response(status: StatusCode, error: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "message": message
        })),
    )
        .into_response()
}
