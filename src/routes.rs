//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack (outermost first)
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │  Process Time    │ ← X-Process-Time on every response, slow request warning
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Sets / echoes X-Request-Id
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │ Normalize Errors │ ← Every 4xx/5xx becomes the JSON error envelope
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │      CORS        │ ← Cross-origin headers, errors included
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Catch Panic    │ ← Handler panics become 500
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │    Deadline      │ ← 504 when the handler overruns
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │   Body Limit     │
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │  Authentication  │ ← 401 / 403, protected routes only
//! └────────┬─────────┘
//!          ▼
//!      Handler
//! ```
//!
//! # Route Groups
//!
//! - `/`, `/health` - Service description and health (no credential)
//! - `/docs`, `/redoc`, `/openapi.json` - API documentation (no credential)
//! - `/api/todos` - To-do items
//! - `/api/{seo,ai-seo,geo}/analyze` - Analysis
//! - `/api/stream` - Server-sent event stream

use axum::Router;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{Span, info, info_span};

use crate::handlers;
use crate::middleware::{
    ApiKeyAuth, PROCESS_TIME_HEADER, ProcessTimeLayer, enforce_deadline, normalize_errors,
    panic_to_fault, route_not_found,
};
use crate::openapi;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application router with all routes and middleware configured.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(openapi::docs_routes());

    let protected = Router::new()
        .route(
            "/api/todos",
            post(handlers::create_todo).get(handlers::list_todos),
        )
        .route("/api/todos/{id}", get(handlers::get_todo))
        .route("/api/seo/analyze", post(handlers::analyze_seo))
        .route("/api/ai-seo/analyze", post(handlers::analyze_ai_seo))
        .route("/api/geo/analyze", post(handlers::analyze_geo))
        .route("/api/stream", get(handlers::stream_data))
        // route_layer: unmatched paths still reach the fallback as 404
        .route_layer(ApiKeyAuth::new(state.allow_list.clone()));

    let router = public.merge(protected).fallback(route_not_found);

    apply_middleware(router, state)
}

/// Wrap `router` in the full middleware stack and attach `state`.
///
/// Exposed so tests can mount extra routes under the same pipeline.
pub fn apply_middleware(router: Router<AppState>, state: AppState) -> Router {
    let config = &state.config;

    info!(
        max_body_bytes = config.max_request_body_size,
        timeout_secs = config.request_timeout.as_secs(),
        slow_threshold_ms = config.slow_request_threshold.as_millis() as u64,
        "Middleware configured"
    );

    // Applied bottom to top: the last layer added runs first.
    router
        .layer(DefaultBodyLimit::max(config.max_request_body_size))
        .layer(from_fn_with_state(state.clone(), enforce_deadline))
        .layer(CatchPanicLayer::custom(panic_to_fault))
        // Outside the deadline and panic layers so 504 and 500 carry CORS headers
        .layer(build_cors_layer(&config.cors_allowed_origins))
        .layer(from_fn(normalize_errors))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(ProcessTimeLayer::new(config.slow_request_threshold))
        .with_state(state)
}

fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Build CORS layer from configuration.
///
/// `*` anywhere in `allowed_origins` allows any origin. Timing and request id
/// headers are exposed to browser clients.
fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_any = allowed_origins.iter().any(|o| o == "*");

    let layer = if allow_any {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<_> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    layer
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([
            HeaderName::from_static(PROCESS_TIME_HEADER),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}
