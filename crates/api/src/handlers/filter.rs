use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use slotfinder_core::{
    errors::TimeError,
    filter::payload_size,
    models::filter::{FilterRequest, FilterResponse},
    time,
};
use tracing::{debug, info};

use crate::{middleware::error_handling::AppError, ApiState};

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: 'now' and/or 'resultList'";
pub const INVALID_NOW_MESSAGE: &str = "Invalid 'now' timestamp format";
pub const RESULT_LIST_NOT_ARRAY_MESSAGE: &str = "'resultList' must be an array";

/// Keeps the records scheduled within the configured window after `now`.
///
/// `now` may be an ISO-8601 string or epoch milliseconds; each record's
/// scheduled time is read from the configured field.
#[axum::debug_handler]
pub async fn filter_records(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<FilterRequest>, JsonRejection>,
) -> Result<Json<FilterResponse>, AppError> {
    let Json(request) =
        payload.map_err(|rejection| TimeError::Validation(rejection.body_text()))?;

    let (Some(now), Some(result_list)) = (
        request.now.filter(time::is_truthy),
        request.result_list.filter(time::is_truthy),
    ) else {
        return Err(TimeError::Validation(MISSING_FIELDS_MESSAGE.to_string()).into());
    };
    debug!(%now, records = ?result_list, "Filtering records");

    let now = time::parse_timestamp_value(&now)
        .ok_or_else(|| TimeError::Validation(INVALID_NOW_MESSAGE.to_string()))?;

    let Value::Array(records) = result_list else {
        return Err(TimeError::Validation(RESULT_LIST_NOT_ARRAY_MESSAGE.to_string()).into());
    };

    let total = records.len();
    let valid_results = state.record_filter.filter_recent_records(records, now);
    let file_size = payload_size(&valid_results);
    info!(total, kept = valid_results.len(), file_size, "Filtered records");

    Ok(Json(FilterResponse {
        valid_results,
        file_size,
    }))
}
