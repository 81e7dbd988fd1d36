//! Service description and health endpoints.
//!
//! Both are reachable without a credential.

use axum::Json;
use chrono::Utc;
use tracing::instrument;

use crate::models::{HealthResponse, RootResponse};

/// Service name reported by `GET /`.
pub const SERVICE_NAME: &str = "Dev Agent Kit API";

/// Root endpoint describing the service.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service description", body = RootResponse)
    )
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        docs: "/docs".to_string(),
        health: "/health".to_string(),
    })
}

/// Health check endpoint. Always returns 200 OK.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "timestamp": "2024-01-15T10:30:00Z",
///   "version": "1.0.0"
/// }
/// ```
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[instrument]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
