//! # Dev Agent Kit API
//!
//! HTTP gateway for developer-agent tooling, built on Axum:
//!
//! - **Security**: Bearer token or `X-API-Key` checked in constant time against an allow-list
//! - **Consistency**: Every error, framework rejections and panics included, uses one JSON envelope
//! - **Observability**: `X-Process-Time` and `X-Request-Id` headers, structured logging, Prometheus metrics
//! - **Documentation**: OpenAPI document with Swagger UI at `/docs` and ReDoc at `/redoc`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Timing → Request ID → Trace → Errors → Auth)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers (health, todos, analysis, stream)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Services (AnalyzerRegistry)                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use devkit_gateway::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = AppState::new(config);
//!     let app = build_router(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! ```bash
//! VALID_API_KEYS=key-one,key-two API_KEY=master-key cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult, ErrorEnvelope};
pub use routes::{apply_middleware, build_router};
pub use state::AppState;
