use axum::{body::to_bytes, http::StatusCode, response::IntoResponse};
use serde_json::{json, Value};
use slotfinder_api::middleware::error_handling::AppError;
use slotfinder_core::errors::TimeError;

#[tokio::test]
async fn test_error_handling_validation() {
    let error = TimeError::Validation("Invalid input".to_string());

    let response = AppError(error).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Invalid input" }));
}

#[tokio::test]
async fn test_error_handling_invalid_timestamp() {
    let error = TimeError::InvalidTimestamp("yesterday".to_string());

    let response = AppError(error).into_response();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_handling_internal() {
    let error = TimeError::Internal(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        "Internal error",
    )));

    let response = AppError(error).into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
