use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Message rendered in the `error` field of every unexpected fault.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Message for requests that reach a protected route without any credential.
pub const UNAUTHENTICATED_MESSAGE: &str =
    "credential required; supply it via Authorization header or X-API-Key header.";

/// Message for requests whose credential is not accepted.
pub const FORBIDDEN_MESSAGE: &str = "invalid credential.";

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Rejections vs Unexpected Faults
///
/// Variants fall into two categories, mirrored by [`Fault`]:
///
/// - **Rejections** (`Unauthenticated`, `Forbidden`, `NotFound`, `Timeout`):
///   deliberate failures whose status and message reach the client verbatim.
/// - **Unexpected faults** (`Internal`, `ConfigError`): always
///   rendered as 500 with a generic message; the error text goes to `detail`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{}", UNAUTHENTICATED_MESSAGE)]
    Unauthenticated,

    #[error("{}", FORBIDDEN_MESSAGE)]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("request deadline exceeded")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) | AppError::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Classify this error for the error normalizer.
    pub fn fault(&self) -> Fault {
        match self {
            AppError::Internal(_) | AppError::ConfigError(_) => Fault::Unexpected(self.to_string()),
            _ => Fault::Rejected(self.to_string()),
        }
    }
}

/// Fault classification carried in response extensions.
///
/// Handlers and guards never render error bodies themselves. They set the
/// status code and attach a `Fault`; the error normalizer middleware, which
/// knows the request path, turns it into an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Deliberate failure; the message is shown to the client as `error`.
    Rejected(String),
    /// Anything else; the text is shown to the client as `detail`.
    Unexpected(String),
}

impl Fault {
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Fault::Unexpected(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut response = self.status().into_response();

        if matches!(self, AppError::Unauthenticated) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response.extensions_mut().insert(self.fault());
        response
    }
}

/// Uniform JSON body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub error: String,
    pub status_code: u16,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorEnvelope {
    /// Build the envelope for a fault raised while serving `path`.
    ///
    /// Unexpected faults are always reported as 500 regardless of `status`.
    pub fn new(status: StatusCode, fault: Fault, path: impl Into<String>) -> Self {
        let path = path.into();
        match fault {
            Fault::Rejected(message) => Self {
                error: message,
                status_code: status.as_u16(),
                path,
                detail: None,
            },
            Fault::Unexpected(detail) => Self {
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                path,
                detail: Some(detail),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
