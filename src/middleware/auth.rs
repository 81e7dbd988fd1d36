//! Credential authentication for protected routes.
//!
//! # Credential Sources
//!
//! A request may carry its credential in one of two places:
//!
//! ```bash
//! # Bearer scheme (takes precedence)
//! curl -H "Authorization: Bearer your-key" http://localhost:8000/api/todos
//!
//! # Custom header
//! curl -H "X-API-Key: your-key" http://localhost:8000/api/todos
//! ```
//!
//! # Accepted Credentials
//!
//! The [`AllowList`] is built once at startup from `VALID_API_KEYS`
//! (comma separated) and `API_KEY` (the master key). It is immutable afterwards.
//!
//! # Failure Modes
//!
//! - No credential (or an empty one): 401 `Unauthenticated`
//! - Credential not accepted: 403 `Forbidden`
//!
//! The guard is attached with `Router::route_layer` to the protected route group
//! only, so `/` and `/health` never see it.

use std::borrow::Cow;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request, Response, header};
use axum::response::IntoResponse;
use subtle::{Choice, ConstantTimeEq};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::metrics;

/// Header name for the custom API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Authorization scheme accepted in the `Authorization` header.
const BEARER_SCHEME: &str = "Bearer";

/// Set of credentials accepted by the guard.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    entries: Vec<String>,
    master_key: Option<String>,
}

impl AllowList {
    /// Build an allow-list; empty and duplicate entries are dropped.
    pub fn new<I, S>(entries: I, master_key: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for entry in entries.into_iter().map(Into::into) {
            if !entry.is_empty() && !unique.contains(&entry) {
                unique.push(entry);
            }
        }

        Self {
            entries: unique,
            master_key: master_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.valid_api_keys.iter().cloned(),
            config.master_api_key.clone(),
        )
    }

    /// Number of listed credentials, excluding the master key.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.master_key.is_none()
    }

    pub fn has_master_key(&self) -> bool {
        self.master_key.is_some()
    }

    /// Accept iff `token` is non-empty and equals a listed entry or the master key.
    ///
    /// Every candidate is compared in constant time and the scan never exits
    /// early, so timing does not reveal which entry matched.
    pub fn accepts(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }

        let mut matched = Choice::from(0);
        for candidate in self.entries.iter().chain(self.master_key.iter()) {
            matched |= token.as_bytes().ct_eq(candidate.as_bytes());
        }
        matched.into()
    }
}

/// Credential that passed validation, attached to request extensions.
#[derive(Clone)]
pub struct AuthenticatedKey(String);

impl AuthenticatedKey {
    /// Log-safe form: first four characters followed by `***`.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}***")
    }
}

impl std::fmt::Debug for AuthenticatedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthenticatedKey").field(&self.masked()).finish()
    }
}

/// Extract the request credential.
///
/// A well-formed `Authorization: Bearer <token>` wins. Otherwise the
/// `X-API-Key` value is returned unmodified. Empty values count as absent.
/// Non-ASCII header bytes are decoded as Latin-1, so such a credential is
/// still present and gets rejected by the allow-list rather than treated as
/// missing.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .map(header_text)
        .as_deref()
        .and_then(parse_bearer)
    {
        return Some(token.to_string());
    }

    headers
        .get(API_KEY_HEADER)
        .map(header_text)
        .filter(|value| !value.is_empty())
        .map(Cow::into_owned)
}

fn header_text(value: &HeaderValue) -> Cow<'_, str> {
    match value.to_str() {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(value.as_bytes().iter().copied().map(char::from).collect()),
    }
}

fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, credentials) = value.trim().split_once(char::is_whitespace)?;
    let credentials = credentials.trim();
    (scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !credentials.is_empty()).then_some(credentials)
}

/// Authentication layer guarding protected routes.
#[derive(Clone)]
pub struct ApiKeyAuth {
    allow_list: Arc<AllowList>,
}

impl ApiKeyAuth {
    pub fn new(allow_list: Arc<AllowList>) -> Self {
        Self { allow_list }
    }
}

impl<S> Layer<S> for ApiKeyAuth {
    type Service = ApiKeyAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiKeyAuthService {
            inner,
            allow_list: self.allow_list.clone(),
        }
    }
}

/// Authentication service wrapper.
#[derive(Clone)]
pub struct ApiKeyAuthService<S> {
    inner: S,
    allow_list: Arc<AllowList>,
}

impl<S> Service<Request<Body>> for ApiKeyAuthService<S>
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

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let allow_list = self.allow_list.clone();
        // Drive the clone that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let Some(token) = extract_credential(req.headers()) else {
                warn!(path = %req.uri().path(), "Missing credential");
                metrics::record_auth_failure("missing");
                return Ok(AppError::Unauthenticated.into_response());
            };

            if !allow_list.accepts(&token) {
                warn!(path = %req.uri().path(), "Invalid credential provided");
                metrics::record_auth_failure("invalid");
                return Ok(AppError::Forbidden.into_response());
            }

            let key = AuthenticatedKey(token);
            debug!(key = %key.masked(), "Credential accepted");
            req.extensions_mut().insert(key);
            inner.call(req).await
        })
    }
}
