//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the SlotFinder
//! API server. It retrieves configuration values from environment variables
//! and provides defaults where appropriate.
//!
//! ## Environment Variables
//!
//! Server:
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//!
//! Slot search:
//!
//! - `SLOT_GRANULARITY_MINUTES`: Slot length and step (default: 10)
//! - `SLOT_ROUNDING_MINUTES`: Boundary the reference instant is rounded down to (default: 10)
//! - `SLOT_WINDOW_END_SOURCE`: `end` or `start` of the latest busy time (default: `end`)
//! - `SLOT_STATIC_WINDOW_DAY`: `YYYY-MM-DD`; searches that civil day instead of a derived window
//! - `SLOT_DROP_FIRST_AVAILABLE`: Hold back the earliest free slot (default: true)
//! - `SLOT_TRUST_INPUT_ORDER`: Window from first/last busy time as given (default: false)
//! - `SLOT_ANCHOR_TO_CLOCK`: Use the server clock when a request has no `now` (default: true)
//! - `SLOT_ALLOW_EMPTY_BUSY_TIMES`: Answer an empty list with a message instead of a 400 (default: false)
//! - `SLOT_DISPLAY_ZONE`: IANA zone used for rounding and rendering (default: "America/New_York")
//! - `SLOT_MAX_WINDOW_DAYS`: Longest window a request may span (default: 31)
//!
//! Record filter:
//!
//! - `FILTER_ENABLED`: Expose `POST /filter` (default: true)
//! - `FILTER_WINDOW_MINUTES`: Window after `now` (default: 30)
//! - `FILTER_TIME_FIELD`: Record key holding the scheduled time (default: "4")

use std::{env, num::NonZeroU32, str::FromStr};

use chrono::{NaiveDate, TimeDelta};
use chrono_tz::Tz;
use eyre::{eyre, Result, WrapErr};
use slotfinder_core::{
    filter::{RecordFilter, DEFAULT_TIME_FIELD, DEFAULT_WINDOW_MINUTES},
    slots::{SearchWindow, SlotOptions, WindowEndSource},
};
use tracing::Level;

/// Configuration for the SlotFinder API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use slotfinder_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// Slot search parameters
    pub slot_options: SlotOptions,

    /// Read the clock when a request carries no reference instant
    pub anchor_to_clock: bool,

    /// Treat an empty busy list as informational rather than invalid
    pub allow_empty_busy_times: bool,

    /// Whether `POST /filter` is routed
    pub filter_enabled: bool,

    /// Record filter parameters
    pub record_filter: RecordFilter,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: Level::INFO,
            cors_origins: None,
            request_timeout: 30,
            slot_options: SlotOptions::default(),
            anchor_to_clock: true,
            allow_empty_busy_times: false,
            filter_enabled: true,
            record_filter: RecordFilter::default(),
        }
    }
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if any variable is set to a value
    /// that cannot be parsed. An unknown `LOG_LEVEL` falls back to info.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Creates a new ApiConfig from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // Network settings
        let host = lookup("API_HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "API_PORT", defaults.port)?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout =
            parse_var(&lookup, "API_REQUEST_TIMEOUT_SECONDS", defaults.request_timeout)?;

        // Slot search settings
        let base = defaults.slot_options;
        let window_end_source = match lookup("SLOT_WINDOW_END_SOURCE") {
            Some(raw) => parse_window_end_source(&raw)?,
            None => base.window_end_source,
        };
        let window = match lookup("SLOT_STATIC_WINDOW_DAY") {
            Some(raw) => SearchWindow::FixedDay(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .wrap_err("Invalid SLOT_STATIC_WINDOW_DAY value")?,
            ),
            None => base.window,
        };
        let display_zone = match lookup("SLOT_DISPLAY_ZONE") {
            Some(raw) => raw
                .trim()
                .parse::<Tz>()
                .map_err(|_| eyre!("Invalid SLOT_DISPLAY_ZONE value `{raw}`"))?,
            None => base.display_zone,
        };
        let slot_options = SlotOptions {
            granularity_minutes: parse_var(
                &lookup,
                "SLOT_GRANULARITY_MINUTES",
                base.granularity_minutes,
            )?,
            rounding_minutes: parse_var(&lookup, "SLOT_ROUNDING_MINUTES", base.rounding_minutes)?,
            window_end_source,
            window,
            drop_first_available: parse_var(
                &lookup,
                "SLOT_DROP_FIRST_AVAILABLE",
                base.drop_first_available,
            )?,
            trust_input_order: parse_var(
                &lookup,
                "SLOT_TRUST_INPUT_ORDER",
                base.trust_input_order,
            )?,
            display_zone,
            max_window_days: parse_var(&lookup, "SLOT_MAX_WINDOW_DAYS", base.max_window_days)?,
        };
        let anchor_to_clock = parse_var(&lookup, "SLOT_ANCHOR_TO_CLOCK", defaults.anchor_to_clock)?;
        let allow_empty_busy_times = parse_var(
            &lookup,
            "SLOT_ALLOW_EMPTY_BUSY_TIMES",
            defaults.allow_empty_busy_times,
        )?;

        // Record filter settings
        let filter_enabled = parse_var(&lookup, "FILTER_ENABLED", defaults.filter_enabled)?;
        let window_minutes: NonZeroU32 =
            parse_var(&lookup, "FILTER_WINDOW_MINUTES", DEFAULT_WINDOW_MINUTES)?;
        let record_filter = RecordFilter {
            time_field: lookup("FILTER_TIME_FIELD").unwrap_or_else(|| DEFAULT_TIME_FIELD.to_string()),
            window: TimeDelta::minutes(i64::from(window_minutes.get())),
        };

        Ok(Self {
            host,
            port,
            log_level,
            cors_origins,
            request_timeout,
            slot_options,
            anchor_to_clock,
            allow_empty_busy_times,
            filter_enabled,
            record_filter,
        })
    }

    /// Returns the server address as a string
    ///
    /// # Returns
    ///
    /// * `String` - Formatted server address (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .wrap_err_with(|| format!("Invalid {key} value `{raw}`")),
        None => Ok(default),
    }
}

fn parse_window_end_source(raw: &str) -> Result<WindowEndSource> {
    match raw.trim().to_lowercase().as_str() {
        "end" | "intervalend" => Ok(WindowEndSource::IntervalEnd),
        "start" | "intervalstart" => Ok(WindowEndSource::IntervalStart),
        other => Err(eyre!(
            "Invalid SLOT_WINDOW_END_SOURCE value `{other}`, expected `end` or `start`"
        )),
    }
}
