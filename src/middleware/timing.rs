//! Request timing middleware.
//!
//! Wraps the whole pipeline, error normalization included, so every response
//! carries an `X-Process-Time` header with the elapsed time in seconds:
//!
//! ```text
//! X-Process-Time: 0.000412
//! ```
//!
//! Requests slower than the configured threshold are logged at `warn`. The
//! warning is advisory and never changes the response.
//!
//! For streaming responses the measurement ends when the response head is
//! produced, not when the body finishes.

use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::header::HeaderValue;
use axum::http::{Request, Response};
use tower::{Layer, Service};
use tracing::warn;

use crate::metrics;

/// Header name for the processing time.
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Timing layer for the Tower middleware stack.
#[derive(Clone, Copy, Debug)]
pub struct ProcessTimeLayer {
    slow_threshold: Duration,
}

impl ProcessTimeLayer {
    /// Create a timing layer warning about requests slower than `slow_threshold`.
    pub fn new(slow_threshold: Duration) -> Self {
        Self { slow_threshold }
    }
}

impl<S> Layer<S> for ProcessTimeLayer {
    type Service = ProcessTimeService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ProcessTimeService {
            inner,
            slow_threshold: self.slow_threshold,
        }
    }
}

/// Timing service wrapper.
#[derive(Clone)]
pub struct ProcessTimeService<S> {
    inner: S,
    slow_threshold: Duration,
}

impl<S> Service<Request<Body>> for ProcessTimeService<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let start = Instant::now();
        let path = req.uri().path().to_owned();
        let method = req.method().clone();
        let slow_threshold = self.slow_threshold;

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(req).await?;
            let elapsed = start.elapsed();
            let seconds = elapsed.as_secs_f64();

            if let Ok(value) = HeaderValue::from_str(&format_seconds(elapsed)) {
                response.headers_mut().insert(PROCESS_TIME_HEADER, value);
            }

            metrics::record_request_duration(method.as_str(), response.status().as_str(), seconds);

            if elapsed > slow_threshold {
                metrics::record_slow_request();
                warn!(
                    path = %path,
                    method = %method,
                    elapsed_secs = seconds,
                    "Slow request detected"
                );
            }

            Ok(response)
        })
    }
}

/// Render a duration as decimal seconds, e.g. `0.000412`.
pub fn format_seconds(elapsed: Duration) -> String {
    format!("{:.6}", elapsed.as_secs_f64())
}
