//! Shared application state for Axum handlers.
//!
//! - **Configuration**: Runtime configuration access
//! - **Allow-list**: Credentials accepted by the auth guard, built once at startup
//! - **Analyzers**: Pluggable analysis backends for the `/api/*/analyze` routes
//!
//! # Structured Concurrency
//!
//! Stream producers are spawned on a `tokio_util::task::TaskTracker` and watch
//! a `CancellationToken`. Call `shutdown()` to stop them before exit.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::config::Config;
use crate::middleware::AllowList;
use crate::services::AnalyzerRegistry;

/// Shared application state, cloned per request. All data sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Accepted credentials (read-only after startup)
    pub allow_list: Arc<AllowList>,
    /// Analysis backends
    pub analyzers: AnalyzerRegistry,
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Create state with the static analyzers.
    pub fn new(config: Config) -> Self {
        Self::with_analyzers(config, AnalyzerRegistry::default())
    }

    pub fn with_analyzers(config: Config, analyzers: AnalyzerRegistry) -> Self {
        let allow_list = AllowList::from_config(&config);
        if allow_list.is_empty() {
            warn!("No credentials configured (VALID_API_KEYS / API_KEY); protected routes will reject every request");
        } else {
            info!(
                keys = allow_list.len(),
                master_key = allow_list.has_master_key(),
                "Credential allow-list loaded"
            );
        }

        Self {
            config: Arc::new(config),
            allow_list: Arc::new(allow_list),
            analyzers,
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Spawn a background task tracked for graceful shutdown.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.task_tracker.spawn(task)
    }

    /// Token cancelled when the application shuts down.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        info!(
            tasks = self.task_tracker.len(),
            "Stopping background tasks"
        );
        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;
        info!("Background tasks stopped");
    }
}
