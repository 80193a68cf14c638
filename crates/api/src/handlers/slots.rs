//! # Slot Handlers
//!
//! `POST /available-slots` turns a list of busy times into the free slots
//! around them.
//!
//! Validation happens here, before the search runs: the busy list must be a
//! JSON array (non-empty unless the deployment allows empty lists), every
//! bound must parse as a timestamp, every interval must end after it starts
//! and the busy times must fit in the configured maximum window. The reference instant is the request's `now` when present,
//! otherwise the server clock when the deployment anchors to it.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;
use slotfinder_core::{
    clock::Clock,
    errors::{TimeError, TimeResult},
    models::slots::{AvailableSlotsRequest, AvailableSlotsResponse, BusyTimeRequest},
    slots::{check_window_span, find_available_slots, Interval},
    time,
};
use tracing::{debug, info};

use crate::{middleware::error_handling::AppError, ApiState};

pub const INVALID_BUSY_TIMES_MESSAGE: &str =
    "Invalid input, expected a non-empty array of busy times";

/// Finds free slots around the supplied busy times
///
/// # Endpoint
///
/// ```text
/// POST /available-slots
/// { "busyTimes": [{ "start": "...", "end": "..." }], "now": "..." }
/// ```
///
/// # Returns
///
/// * `{ "alternateTimes": [...] }` when at least one slot is free
/// * `{ "message": "..." }` when there is nothing to offer
///
/// # Errors
///
/// * `TimeError::Validation` - Missing, non-array or empty `busyTimes`, an
///   interval that does not end after it starts, or busy times spread over a
///   longer window than the deployment searches
/// * `TimeError::InvalidTimestamp` - An unparsable `start`, `end` or `now`
#[axum::debug_handler]
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<AvailableSlotsRequest>, JsonRejection>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(%rejection, "Rejected available-slots body");
        TimeError::Validation(INVALID_BUSY_TIMES_MESSAGE.to_string())
    })?;
    debug!(busy_times = ?request.busy_times, now = ?request.now, "Checking available slots");

    let busy_times = match request.busy_times {
        Some(busy_times) if !busy_times.is_empty() || state.allow_empty_busy_times => busy_times,
        _ => {
            return Err(TimeError::Validation(INVALID_BUSY_TIMES_MESSAGE.to_string()).into());
        }
    };

    let intervals = busy_times
        .iter()
        .map(BusyTimeRequest::to_interval)
        .collect::<TimeResult<Vec<Interval>>>()?;
    check_window_span(&intervals, &state.slot_options)?;

    let reference = match request.now.as_deref() {
        Some(now) => Some(time::parse_instant(now)?),
        None if state.anchor_to_clock => Some(state.clock.now()),
        None => None,
    };

    let search = find_available_slots(&intervals, reference, &state.slot_options);
    info!(
        busy = intervals.len(),
        available = search.slots().len(),
        "Slot search finished"
    );

    Ok(Json(AvailableSlotsResponse::from(&search)))
}
