//! # SlotFinder API
//!
//! The API crate provides the web server for the SlotFinder service. It exposes
//! the free slot search and the recent record filter over HTTP.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Validate requests and call into `slotfinder-core`
//! - **Middleware**: Map domain errors onto HTTP responses
//! - **Config**: Handle environment and application configuration
//!
//! The computations themselves live in `slotfinder-core`; nothing here keeps
//! state between requests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that validate input and run the computations
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use eyre::{Result, WrapErr};
use slotfinder_core::{clock::Clock, filter::RecordFilter, slots::SlotOptions};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use crate::config::ApiConfig;

/// Shared application state that is accessible to all request handlers
///
/// Everything here is read-only for the lifetime of the server.
pub struct ApiState {
    /// Source of "now" for requests that do not carry one
    pub clock: Arc<dyn Clock>,
    /// Slot search parameters for this deployment
    pub slot_options: SlotOptions,
    /// Read the clock when a request has no `now`
    pub anchor_to_clock: bool,
    /// Answer an empty busy list with a message instead of a 400
    pub allow_empty_busy_times: bool,
    /// Record filter parameters for this deployment
    pub record_filter: RecordFilter,
}

impl ApiState {
    pub fn new(config: &ApiConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            slot_options: config.slot_options.clone(),
            anchor_to_clock: config.anchor_to_clock,
            allow_empty_busy_times: config.allow_empty_busy_times,
            record_filter: config.record_filter.clone(),
        }
    }
}

/// Builds the application router with all routes and layers applied
///
/// # Errors
///
/// Returns an error when a configured CORS origin is not a valid header value.
pub fn build_router(config: &ApiConfig, state: Arc<ApiState>) -> Result<Router> {
    let mut app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Slot search endpoint
        .merge(routes::slots::routes());

    // Record filter endpoint, only in deployments that expose it
    if config.filter_enabled {
        app = app.merge(routes::filter::routes());
    }

    let app = app.with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .wrap_err("Invalid API_CORS_ORIGINS entry")?;
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_origin(origins);

        app.layer(cors)
    } else {
        app
    };

    // Request logging and timeout
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    Ok(app)
}

/// The listening HTTP server
///
/// Constructed once at process start: binding happens in [`Server::bind`], so
/// the bound address is known before any request is served.
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Binds the configured address and prepares the router
    ///
    /// # Errors
    ///
    /// Returns an error if the router cannot be built or the address cannot be bound.
    pub async fn bind(config: &ApiConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let state = Arc::new(ApiState::new(config, clock));
        let router = build_router(config, state)?;

        let addr = config.server_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .wrap_err_with(|| format!("Failed to bind {addr}"))?;

        Ok(Self { listener, router })
    }

    /// Address the server is actually listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serves requests until ctrl-c is received
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serves requests until `signal` completes, then drains in-flight requests
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!("Server listening on http://{}", self.local_addr()?);
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(signal)
            .await?;
        info!("Server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler the server runs until the process is killed.
        std::future::pending::<()>().await;
    }
}

/// Starts the API server with the provided configuration and clock
///
/// This function sets up logging, binds the configured address and serves
/// requests until ctrl-c.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use slotfinder_api::{config::ApiConfig, start_server};
/// use slotfinder_core::clock::SystemClock;
///
/// # async fn run() -> eyre::Result<()> {
/// let config = ApiConfig::from_env()?;
/// start_server(config, Arc::new(SystemClock)).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: ApiConfig, clock: Arc<dyn Clock>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Server::bind(&config, clock).await?.serve().await
}
