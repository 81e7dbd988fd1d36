//! Error normalization.
//!
//! Every non-2xx response leaves the service as an [`ErrorEnvelope`]:
//!
//! ```json
//! { "error": "invalid credential.", "status_code": 403, "path": "/api/todos" }
//! ```
//!
//! Sources of faults and how they are rendered:
//!
//! | Source                               | `error`                 | `detail`      |
//! |--------------------------------------|-------------------------|---------------|
//! | `AppError` rejection                 | message verbatim        | -             |
//! | `AppError` unexpected fault          | `internal server error` | error text    |
//! | panic (via [`panic_to_fault`])       | `internal server error` | panic payload |
//! | framework 4xx (JSON rejection, 405…) | body text or reason     | -             |
//! | framework 5xx                        | `internal server error` | body text     |

use std::any::Any;

use axum::body::{Body, to_bytes};
use axum::extract::Request;
use axum::http::header::{self, HeaderMap, HeaderValue};
use axum::http::{Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use percent_encoding::percent_decode_str;
use tracing::{debug, error, warn};

use crate::error::{AppError, ErrorEnvelope, Fault};

/// Upper bound on framework error bodies read back for re-rendering.
const MAX_REJECTION_BODY_BYTES: usize = 16 * 1024;

/// Middleware rendering faults into the JSON error envelope.
pub async fn normalize_errors(request: Request, next: Next) -> Response<Body> {
    let path = decoded_path(request.uri().path());
    let response = next.run(request).await;

    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let fault = match parts.extensions.remove::<Fault>() {
        Some(fault) => fault,
        None if is_json(&parts.headers) => return Response::from_parts(parts, body),
        None => fault_from_body(status, body).await,
    };

    match &fault {
        Fault::Unexpected(detail) => {
            error!(path = %path, status = %status, detail = %detail, "Unexpected fault")
        }
        Fault::Rejected(message) if status.is_server_error() => {
            warn!(path = %path, status = %status, message = %message, "Request rejected")
        }
        Fault::Rejected(message) => {
            debug!(path = %path, status = %status, message = %message, "Request rejected")
        }
    }

    let envelope = ErrorEnvelope::new(status, fault, path);
    parts.status = envelope.status();
    render(parts, &envelope)
}

/// Turn a caught panic into an unexpected fault for [`normalize_errors`].
///
/// Used with `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_to_fault(payload: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "handler panicked".to_string()
    };

    error!(detail = %detail, "Handler panicked");

    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(Fault::Unexpected(detail));
    response
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}

/// Percent-decoded request path, as reported in the envelope.
fn decoded_path(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

async fn fault_from_body(status: StatusCode, body: Body) -> Fault {
    let text = to_bytes(body, MAX_REJECTION_BODY_BYTES)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let text = if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text
    };

    if status.is_server_error() {
        Fault::Unexpected(text)
    } else {
        Fault::Rejected(text)
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

fn render(mut parts: axum::http::response::Parts, envelope: &ErrorEnvelope) -> Response<Body> {
    let bytes = serde_json::to_vec(envelope).unwrap_or_else(|_| {
        br#"{"error":"internal server error","status_code":500,"path":""}"#.to_vec()
    });

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::{FORBIDDEN_MESSAGE, INTERNAL_ERROR_MESSAGE};
    use axum::Router;
    use axum::routing::get;
    use tower::ServiceExt;
    use tower_http::catch_panic::CatchPanicLayer;

    async fn explode() -> &'static str {
        panic!("kaboom")
    }

    fn app() -> Router {
        Router::new()
            .route("/ok", get(|| async { "fine" }))
            .route("/forbidden", get(|| async { AppError::Forbidden }))
            .route(
                "/internal",
                get(|| async { AppError::Internal("disk on fire".to_string()) }),
            )
            .route(
                "/plain",
                get(|| async { (StatusCode::BAD_REQUEST, "bad things") }),
            )
            .route("/panic", get(explode))
            .fallback(route_not_found)
            .layer(CatchPanicLayer::custom(panic_to_fault))
            .layer(axum::middleware::from_fn(normalize_errors))
    }

    async fn call(uri: &str) -> (StatusCode, HeaderMap, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, headers, json)
    }

    #[tokio::test]
    async fn test_success_untouched() {
        let response = app()
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"fine");
    }

    #[tokio::test]
    async fn test_rejection_rendered_verbatim() {
        let (status, headers, json) = call("/forbidden").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(json["error"], FORBIDDEN_MESSAGE);
        assert_eq!(json["status_code"], 403);
        assert_eq!(json["path"], "/forbidden");
        assert!(json.get("detail").is_none());
    }

    #[tokio::test]
    async fn test_unexpected_fault_has_detail() {
        let (status, _, json) = call("/internal").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(json["status_code"], 500);
        assert!(json["detail"].as_str().unwrap().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_panic_becomes_envelope() {
        let (status, _, json) = call("/panic").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(json["detail"], "kaboom");
        assert_eq!(json["path"], "/panic");
    }

    #[tokio::test]
    async fn test_plain_text_rejection_rewritten() {
        let (status, _, json) = call("/plain").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "bad things");
        assert_eq!(json["status_code"], 400);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _, json) = call("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "route not found");
        assert_eq!(json["path"], "/nope");
    }

    #[tokio::test]
    async fn test_envelope_path_is_decoded() {
        let (status, _, json) = call("/no%20such/caf%C3%A9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["path"], "/no such/café");
    }

    #[test]
    fn test_decoded_path_keeps_invalid_escapes() {
        assert_eq!(decoded_path("/a%2Fb"), "/a/b");
        assert_eq!(decoded_path("/100%"), "/100%");
    }

    #[tokio::test]
    async fn test_fault_from_empty_body_uses_reason() {
        let fault = fault_from_body(StatusCode::METHOD_NOT_ALLOWED, Body::empty()).await;
        assert_eq!(fault, Fault::Rejected("Method Not Allowed".to_string()));
    }
}
