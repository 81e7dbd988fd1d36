//! Per-request deadline middleware.
//!
//! Every request runs under a deadline (`REQUEST_TIMEOUT_SECS`, default 30s).
//! Clients may ask for a shorter one via the `X-Request-Timeout` header:
//!
//! ```text
//! X-Request-Timeout: 5000  # 5 seconds in milliseconds
//! ```
//!
//! The effective deadline is the smaller of the client value and the server
//! default. Values outside `MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS`
//! or unparsable values are ignored. When the deadline passes, the handler
//! future is dropped and the request is rejected with 504.
//!
//! For streaming responses the deadline covers producing the response head;
//! the body is not bounded.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Minimum accepted client timeout (100ms).
pub const MIN_REQUEST_TIMEOUT_MS: u64 = 100;

/// Maximum accepted client timeout (5 minutes).
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;

/// Header name for client-specified request timeout.
pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout";

/// Client-requested timeout parsed from `X-Request-Timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout {
    pub duration: Duration,
}

impl RequestTimeout {
    /// Returns `None` if the value is outside the allowed range.
    pub fn from_millis(ms: u64) -> Option<Self> {
        (MIN_REQUEST_TIMEOUT_MS..=MAX_REQUEST_TIMEOUT_MS)
            .contains(&ms)
            .then(|| Self {
                duration: Duration::from_millis(ms),
            })
    }

    /// Parse the `X-Request-Timeout` header, ignoring invalid values.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(REQUEST_TIMEOUT_HEADER)?.to_str().ok()?;
        let Ok(ms) = raw.trim().parse::<u64>() else {
            debug!(value = raw, "Invalid X-Request-Timeout header value, ignoring");
            return None;
        };

        let timeout = Self::from_millis(ms);
        if timeout.is_none() {
            debug!(
                timeout_ms = ms,
                min = MIN_REQUEST_TIMEOUT_MS,
                max = MAX_REQUEST_TIMEOUT_MS,
                "Client timeout outside allowed range, ignoring"
            );
        }
        timeout
    }
}

/// Effective deadline for a request: the client value can only shorten `default`.
pub fn effective_deadline(headers: &HeaderMap, default: Duration) -> Duration {
    RequestTimeout::from_headers(headers)
        .map(|t| t.duration.min(default))
        .unwrap_or(default)
}

/// Middleware enforcing the request deadline.
pub async fn enforce_deadline(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let deadline = effective_deadline(request.headers(), state.config.request_timeout);

    let path = request.uri().path().to_owned();
    match tokio::time::timeout(deadline, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(path = %path, deadline_ms = deadline.as_millis() as u64, "Request deadline exceeded");
            AppError::Timeout.into_response()
        }
    }
}
