use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use slotfinder_api::{build_router, config::ApiConfig, ApiState};
use slotfinder_core::mock::MockClock;
use tower::ServiceExt;

pub struct TestContext {
    pub config: ApiConfig,
    pub clock: MockClock,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_vars(&[])
    }

    /// Configuration as if only `vars` were set in the environment
    pub fn with_vars(vars: &[(&str, &str)]) -> Self {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        let config = ApiConfig::from_vars(|key| {
            vars.iter()
                .find(|(candidate, _)| candidate == key)
                .map(|(_, value)| value.clone())
        })
        .expect("test configuration should parse");

        Self {
            config,
            clock: MockClock::new(),
        }
    }

    /// Freezes the clock at `now` for every read
    pub fn frozen_at(mut self, now: DateTime<Utc>) -> Self {
        self.clock.expect_now().returning(move || now);
        self
    }

    /// Fails the test if the clock is read
    pub fn clock_unused(mut self) -> Self {
        self.clock.expect_now().never();
        self
    }

    // Build the router around the mock clock
    pub fn router(self) -> Router {
        let state = Arc::new(ApiState::new(&self.config, Arc::new(self.clock)));
        build_router(&self.config, state).expect("router should build")
    }
}

pub fn utc(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .expect("valid RFC 3339 literal")
        .with_timezone(&Utc)
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .expect("request should build");

    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, body)
}

pub async fn post_json(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    send(router, Method::POST, uri, Body::from(body.to_string())).await
}
