use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::AnalysisOptions;

/// Service description returned by `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    /// Path of the interactive API docs
    pub docs: String,
    /// Path of the health endpoint
    pub health: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service health status
    pub status: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
    /// Service version
    pub version: String,
}

/// A to-do item, used both as request body and response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TodoItem {
    /// Assigned by the server on creation; ignored on input
    #[serde(default)]
    pub id: Option<String>,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub milestone: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

fn default_status() -> String {
    "pending".to_string()
}

impl TodoItem {
    /// Assign a timestamp-derived id (`todo_<unix-seconds>`).
    ///
    /// Two items created within the same second get the same id.
    pub fn with_id_from(mut self, now: DateTime<Utc>) -> Self {
        self.id = Some(format!("todo_{}", now.timestamp()));
        self
    }
}

/// Query parameters for `GET /api/todos`.
#[derive(Debug, Default, Deserialize)]
pub struct TodoListQuery {
    /// Status filter (accepted, currently unused)
    pub status: Option<String>,
}

/// Response for `GET /api/todos`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoListResponse {
    pub todos: Vec<TodoItem>,
    pub total: usize,
}

/// Request body of the analysis endpoints.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    /// Target URL
    pub url: String,
    /// Analyzer options; missing or `null` means no options. Values are
    /// booleans, numbers or strings.
    #[serde(default, deserialize_with = "null_as_default")]
    #[schema(value_type = Object)]
    pub options: AnalysisOptions,
}

/// Response of the analysis endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub url: String,
    pub timestamp: DateTime<Utc>,
    /// Score per category, 0..=100; always contains `overall`
    pub scores: std::collections::BTreeMap<String, u32>,
    pub recommendations: Vec<String>,
}

/// Payload of one server-sent event on `/api/stream`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StreamEvent {
    pub index: u32,
    pub timestamp: DateTime<Utc>,
}

impl StreamEvent {
    pub fn now(index: u32) -> Self {
        Self {
            index,
            timestamp: Utc::now(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
