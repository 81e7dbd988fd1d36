//! HTTP middleware for authentication, error normalization, and observability.
//!
//! - **Timing**: `X-Process-Time` on every response, slow request warnings
//! - **Error Normalization**: one JSON envelope for every non-2xx response
//! - **Deadline**: per-request timeout, optionally shortened by the client
//! - **Authentication**: bearer token or `X-API-Key`, checked against the allow-list
//!
//! # Architecture
//!
//! ```text
//! Request → Timing → Request ID → Trace → Normalize Errors → CORS
//!         → Catch Panic → Deadline → Body Limit → [Auth] → Handler
//!             ↓                     ↓            ↓        ↓
//!      X-Process-Time        JSON envelope     504    401 / 403
//! ```

pub mod auth;
pub mod errors;
pub mod timeout;
pub mod timing;

pub use auth::{AllowList, ApiKeyAuth, AuthenticatedKey, extract_credential};
pub use errors::{normalize_errors, panic_to_fault, route_not_found};
pub use timeout::{
    MAX_REQUEST_TIMEOUT_MS, MIN_REQUEST_TIMEOUT_MS, REQUEST_TIMEOUT_HEADER, enforce_deadline,
};
pub use timing::{PROCESS_TIME_HEADER, ProcessTimeLayer};
