use axum::{body::Body, http::{Method, StatusCode}};
use pretty_assertions::assert_eq;
use serde_json::json;
use slotfinder_api::handlers::slots::INVALID_BUSY_TIMES_MESSAGE;

use crate::test_utils::{post_json, send, utc, TestContext};

fn one_busy_hour() -> serde_json::Value {
    json!({
        "busyTimes": [{ "start": "2025-02-17T14:00:00Z", "end": "2025-02-17T15:00:00Z" }]
    })
}

#[test_log::test(tokio::test)]
async fn test_available_slots_from_clock() {
    let router = TestContext::new()
        .frozen_at(utc("2025-02-17T13:07:00Z"))
        .router();

    let (status, body) = post_json(&router, "/available-slots", &one_busy_hour()).await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["alternateTimes"].as_array().expect("alternateTimes array");
    // 13:00 onwards, busy hour removed, first free slot held back
    assert_eq!(slots.len(), 59);
    assert_eq!(slots[0], "2025-02-17T08:10:00.000-05:00");
    assert!(!slots.contains(&json!("2025-02-17T09:00:00.000-05:00")));
    assert_eq!(slots[58], "2025-02-17T18:50:00.000-05:00");
}

#[tokio::test]
async fn test_request_now_overrides_clock() {
    let router = TestContext::new().clock_unused().router();
    let mut body = one_busy_hour();
    body["now"] = json!("2025-02-17T20:31:00Z");

    let (status, body) = post_json(&router, "/available-slots", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["alternateTimes"],
        json!([
            "2025-02-17T15:40:00.000-05:00",
            "2025-02-17T15:50:00.000-05:00",
            "2025-02-17T16:00:00.000-05:00",
            "2025-02-17T16:10:00.000-05:00",
            "2025-02-17T16:20:00.000-05:00",
            "2025-02-17T16:30:00.000-05:00",
            "2025-02-17T16:40:00.000-05:00",
            "2025-02-17T16:50:00.000-05:00",
            "2025-02-17T17:00:00.000-05:00",
            "2025-02-17T17:10:00.000-05:00",
            "2025-02-17T17:20:00.000-05:00",
            "2025-02-17T17:30:00.000-05:00",
            "2025-02-17T17:40:00.000-05:00",
            "2025-02-17T17:50:00.000-05:00",
            "2025-02-17T18:00:00.000-05:00",
            "2025-02-17T18:10:00.000-05:00",
            "2025-02-17T18:20:00.000-05:00",
            "2025-02-17T18:30:00.000-05:00",
            "2025-02-17T18:40:00.000-05:00",
            "2025-02-17T18:50:00.000-05:00"
        ])
    );
}

#[tokio::test]
async fn test_clock_past_window_reports_no_slots() {
    let router = TestContext::new()
        .frozen_at(utc("2025-02-18T09:00:00Z"))
        .router();

    let (status, body) = post_json(&router, "/available-slots", &one_busy_hour()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "No slots available after current time" }));
}

#[tokio::test]
async fn test_identical_requests_give_identical_answers() {
    let router = TestContext::new()
        .frozen_at(utc("2025-02-17T10:55:00Z"))
        .router();

    let first = post_json(&router, "/available-slots", &one_busy_hour()).await;
    let second = post_json(&router, "/available-slots", &one_busy_hour()).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_static_day_deployment() {
    let router = TestContext::with_vars(&[
        ("SLOT_GRANULARITY_MINUTES", "15"),
        ("SLOT_STATIC_WINDOW_DAY", "2025-02-17"),
        ("SLOT_DROP_FIRST_AVAILABLE", "false"),
        ("SLOT_ANCHOR_TO_CLOCK", "false"),
        ("SLOT_DISPLAY_ZONE", "UTC"),
    ])
    .clock_unused()
    .router();

    let (status, body) = post_json(&router, "/available-slots", &one_busy_hour()).await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["alternateTimes"].as_array().expect("alternateTimes array");
    assert_eq!(slots.len(), 92);
    assert_eq!(slots[0], "2025-02-17T00:00:00.000Z");
    assert_eq!(slots[55], "2025-02-17T13:45:00.000Z");
    assert_eq!(slots[56], "2025-02-17T15:00:00.000Z");
    assert_eq!(slots[91], "2025-02-17T23:45:00.000Z");
}

#[tokio::test]
async fn test_unanchored_search_message() {
    let router = TestContext::with_vars(&[("SLOT_ANCHOR_TO_CLOCK", "false")])
        .clock_unused()
        .router();
    let body = json!({
        "busyTimes": [{ "start": "2025-02-17T00:00:00Z", "end": "2025-02-18T00:00:00Z" }]
    });
    let router_start = TestContext::with_vars(&[
        ("SLOT_ANCHOR_TO_CLOCK", "false"),
        ("SLOT_WINDOW_END_SOURCE", "start"),
    ])
    .clock_unused()
    .router();

    let (_, whole_day_and_next) = post_json(&router, "/available-slots", &body).await;
    let (status, only_first_day) = post_json(&router_start, "/available-slots", &body).await;

    // Closing on the end pulls in all of the 18th
    assert_eq!(whole_day_and_next["alternateTimes"].as_array().map(Vec::len), Some(143));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(only_first_day, json!({ "message": "No slots available" }));
}

#[tokio::test]
async fn test_missing_busy_times_is_rejected() {
    let router = TestContext::new().clock_unused().router();

    for body in [json!({}), json!({ "busyTimes": null }), json!({ "busyTimes": [] })] {
        let (status, response) = post_json(&router, "/available-slots", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({ "error": INVALID_BUSY_TIMES_MESSAGE }));
    }
}

#[tokio::test]
async fn test_non_array_busy_times_is_rejected() {
    let router = TestContext::new().clock_unused().router();

    let (status, response) =
        post_json(&router, "/available-slots", &json!({ "busyTimes": "14:00-15:00" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response, json!({ "error": INVALID_BUSY_TIMES_MESSAGE }));
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let router = TestContext::new().clock_unused().router();

    let (status, response) =
        send(&router, Method::POST, "/available-slots", Body::from("{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], INVALID_BUSY_TIMES_MESSAGE);
}

#[tokio::test]
async fn test_empty_busy_times_allowed_by_config() {
    let router = TestContext::with_vars(&[("SLOT_ALLOW_EMPTY_BUSY_TIMES", "true")])
        .frozen_at(utc("2025-02-17T13:07:00Z"))
        .router();

    let (status, response) =
        post_json(&router, "/available-slots", &json!({ "busyTimes": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "message": "No busy times provided" }));
}

#[tokio::test]
async fn test_unparsable_timestamp_is_rejected() {
    let router = TestContext::new().clock_unused().router();
    let body = json!({
        "busyTimes": [{ "start": "2025-02-17T14:00:00Z", "end": "quarter past never" }]
    });

    let (status, response) = post_json(&router, "/available-slots", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid timestamp: quarter past never");
}

#[tokio::test]
async fn test_unparsable_now_is_rejected() {
    let router = TestContext::new().clock_unused().router();
    let mut body = one_busy_hour();
    body["now"] = json!("later");

    let (status, response) = post_json(&router, "/available-slots", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "Invalid timestamp: later");
}

#[tokio::test]
async fn test_inverted_interval_is_rejected() {
    let router = TestContext::new().clock_unused().router();
    let body = json!({
        "busyTimes": [{ "start": "2025-02-17T15:00:00Z", "end": "2025-02-17T14:00:00Z" }]
    });

    let (status, response) = post_json(&router, "/available-slots", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .is_some_and(|message| message.starts_with("Busy time must start before it ends")));
}

#[tokio::test]
async fn test_busy_times_beyond_window_limit_are_rejected() {
    let router = TestContext::new().clock_unused().router();
    let body = json!({
        "busyTimes": [
            { "start": "2000-01-01T09:00:00Z", "end": "2000-01-01T10:00:00Z" },
            { "start": "2099-12-31T09:00:00Z", "end": "2099-12-31T10:00:00Z" }
        ]
    });

    let (status, response) = post_json(&router, "/available-slots", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"]
        .as_str()
        .is_some_and(|message| message.ends_with("the search is limited to 31 days")));
}

#[tokio::test]
async fn test_window_limit_follows_config() {
    let router = TestContext::with_vars(&[("SLOT_MAX_WINDOW_DAYS", "1")])
        .clock_unused()
        .router();
    let body = json!({
        "busyTimes": [
            { "start": "2025-02-17T09:00:00Z", "end": "2025-02-17T10:00:00Z" },
            { "start": "2025-02-18T09:00:00Z", "end": "2025-02-18T10:00:00Z" }
        ],
        "now": "2025-02-17T08:00:00Z"
    });

    let (status, _) = post_json(&router, "/available-slots", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
