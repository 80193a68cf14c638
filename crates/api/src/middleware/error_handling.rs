//! # Error Handling Middleware
//!
//! This module provides a standardized way to handle errors in the SlotFinder
//! API. It maps domain-specific errors to HTTP status codes and a JSON body of
//! the form `{ "error": message }`.
//!
//! Informational outcomes (no busy times, no free slots, no matching records)
//! are not errors and never pass through here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use slotfinder_core::errors::TimeError;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps domain-specific `TimeError` instances and implements
/// `IntoResponse` to convert them into HTTP responses.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use slotfinder_api::middleware::error_handling::AppError;
/// use slotfinder_core::time::parse_instant;
///
/// async fn handler(raw: String) -> Result<Json<String>, AppError> {
///     let instant = parse_instant(&raw)?;
///     Ok(Json(instant.to_rfc3339()))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub TimeError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            TimeError::Validation(_) => StatusCode::BAD_REQUEST,
            TimeError::InvalidTimestamp(_) => StatusCode::BAD_REQUEST,
            TimeError::Internal(err) => {
                error!(error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

/// Allows `?` on `Result<T, TimeError>` inside handlers returning
/// `Result<T, AppError>`.
impl From<TimeError> for AppError {
    fn from(err: TimeError) -> Self {
        AppError(err)
    }
}
