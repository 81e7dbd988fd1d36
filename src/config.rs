//! Application configuration loaded from environment variables.
//!
//! # Configuration Hierarchy
//!
//! All configuration is loaded from environment variables with sensible defaults
//! for development. In production, configure via environment variables or a `.env` file.
//!
//! # Security Configuration
//!
//! - `VALID_API_KEYS`: Comma-separated list of accepted credentials
//! - `API_KEY`: Single master credential, accepted regardless of the list
//! - `CORS_ALLOWED_ORIGINS`: Comma-separated list of allowed origins (default: `*` for dev)
//!
//! # Request Handling
//!
//! - `REQUEST_TIMEOUT_SECS`: Default per-request deadline (default: 30)
//! - `SLOW_REQUEST_THRESHOLD_MS`: Slow request warning threshold (default: 1000)
//! - `STREAM_EVENT_COUNT` / `STREAM_INTERVAL_MS`: Demo SSE stream shape (default: 10 / 100)

use std::env;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Application configuration loaded from environment variables.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.server_addr());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Server host address (default: "0.0.0.0")
    pub host: String,

    /// Server port (default: 8000)
    pub port: u16,

    /// Debug mode; lowers the default log filter to `debug`
    pub debug: bool,

    // =========================================================================
    // Security Configuration
    // =========================================================================
    /// Accepted credentials (`VALID_API_KEYS`, comma separated)
    pub valid_api_keys: Vec<String>,

    /// Master credential (`API_KEY`), accepted regardless of `valid_api_keys`
    pub master_api_key: Option<String>,

    /// Allowed CORS origins. `*` allows any origin (not recommended for production)
    pub cors_allowed_origins: Vec<String>,

    /// Maximum request body size in bytes (default: 1MB)
    pub max_request_body_size: usize,

    // =========================================================================
    // Request Handling Configuration
    // =========================================================================
    /// Default deadline for producing a response (default: 30 seconds)
    pub request_timeout: Duration,

    /// Requests slower than this are logged as warnings (default: 1 second)
    pub slow_request_threshold: Duration,

    /// Number of events emitted by `/api/stream` (default: 10)
    pub stream_event_count: u32,

    /// Delay between two stream events (default: 100ms)
    pub stream_interval: Duration,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    /// Log filter (`RUST_LOG`, or derived from `debug`)
    pub log_level: String,

    /// Port for Prometheus metrics endpoint (default: 0 = disabled)
    pub metrics_port: u16,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if any value fails to parse or validate.
    pub fn from_env() -> AppResult<Self> {
        // Load an .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let debug = Self::parse_flag("DEBUG")?;

        let config = Self {
            // Server
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_env("PORT", 8000)?,
            debug,

            // Security
            valid_api_keys: parse_list(&env::var("VALID_API_KEYS").unwrap_or_default()),
            master_api_key: env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            cors_allowed_origins: parse_list(
                &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
            ),
            max_request_body_size: Self::parse_env("MAX_REQUEST_BODY_SIZE", 1024 * 1024)?,

            // Request handling
            request_timeout: Duration::from_secs(Self::parse_env("REQUEST_TIMEOUT_SECS", 30)?),
            slow_request_threshold: Duration::from_millis(Self::parse_env(
                "SLOW_REQUEST_THRESHOLD_MS",
                1000,
            )?),
            stream_event_count: Self::parse_env("STREAM_EVENT_COUNT", 10)?,
            stream_interval: Duration::from_millis(Self::parse_env("STREAM_INTERVAL_MS", 100)?),

            // Observability
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| if debug { "debug" } else { "info" }.to_string()),
            metrics_port: Self::parse_env("METRICS_PORT", 0)?,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values for consistency and correctness.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if validation fails.
    fn validate(&self) -> AppResult<()> {
        if self.request_timeout.is_zero() {
            return Err(AppError::ConfigError(
                "REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        if self.slow_request_threshold.is_zero() {
            return Err(AppError::ConfigError(
                "SLOW_REQUEST_THRESHOLD_MS must be greater than 0".to_string(),
            ));
        }

        if self.stream_event_count == 0 {
            return Err(AppError::ConfigError(
                "STREAM_EVENT_COUNT must be greater than 0".to_string(),
            ));
        }

        if self.max_request_body_size == 0 {
            return Err(AppError::ConfigError(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the full server address for binding.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if any credential can ever be accepted.
    pub fn has_credentials(&self) -> bool {
        !self.valid_api_keys.is_empty() || self.master_api_key.is_some()
    }

    /// Check if Prometheus metrics export is enabled.
    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Get the metrics endpoint address.
    ///
    /// Returns `None` if metrics are disabled (port = 0).
    pub fn metrics_addr(&self) -> Option<std::net::SocketAddr> {
        self.metrics_enabled()
            .then(|| std::net::SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }

    /// Parse an environment variable into the specified type with a default value.
    fn parse_env<T>(name: &str, default: T) -> AppResult<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match env::var(name) {
            Ok(val) => val
                .trim()
                .parse()
                .map_err(|e| AppError::ConfigError(format!("Invalid {name}: {e}"))),
            Err(_) => Ok(default),
        }
    }

    /// Parse a boolean flag; accepts `1/0`, `true/false`, `yes/no`, `on/off`.
    fn parse_flag(name: &str) -> AppResult<bool> {
        match env::var(name) {
            Ok(val) => parse_bool(&val)
                .ok_or_else(|| AppError::ConfigError(format!("Invalid {name}: {val:?}"))),
            Err(_) => Ok(false),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empties and duplicates.
fn parse_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|existing| existing == item) {
            items.push(item.to_string());
        }
    }
    items
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Default configuration for testing and development.
///
/// Production deployments should use `Config::from_env()` instead.
impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            debug: false,
            valid_api_keys: vec![],
            master_api_key: None,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
            slow_request_threshold: Duration::from_secs(1),
            stream_event_count: 10,
            stream_interval: Duration::from_millis(100),
            log_level: "info".to_string(),
            metrics_port: 0,
        }
    }
}
