//! Wire-format tests for the public API models.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::{TimeZone, Utc};
use serde_json::json;

use devkit_gateway::models::*;

mod todo_tests {
    use super::*;

    #[test]
    fn test_todo_defaults() {
        let todo: TodoItem = serde_json::from_value(json!({ "description": "ship it" })).unwrap();

        assert_eq!(todo.id, None);
        assert_eq!(todo.priority, "medium");
        assert_eq!(todo.status, "pending");
        assert_eq!(todo.milestone, None);
    }

    #[test]
    fn test_todo_requires_description() {
        let result: Result<TodoItem, _> = serde_json::from_value(json!({ "priority": "low" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_todo_id_from_unix_seconds() {
        let todo: TodoItem = serde_json::from_value(json!({
            "id": "client-chosen",
            "description": "ship it",
            "milestone": "v2"
        }))
        .unwrap();

        let now = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let todo = todo.with_id_from(now);

        assert_eq!(todo.id.as_deref(), Some("todo_1705314600"));
        assert_eq!(todo.milestone.as_deref(), Some("v2"));
    }

    #[test]
    fn test_todo_list_response_shape() {
        let response = TodoListResponse {
            todos: vec![],
            total: 0,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "todos": [], "total": 0 })
        );
    }
}

mod analysis_tests {
    use super::*;

    #[test]
    fn test_analysis_request_without_options() {
        let request: AnalysisRequest =
            serde_json::from_value(json!({ "url": "https://example.com" })).unwrap();
        assert!(request.options.is_empty());

        let request: AnalysisRequest =
            serde_json::from_value(json!({ "url": "https://example.com", "options": null }))
                .unwrap();
        assert!(request.options.is_empty());
    }

    #[test]
    fn test_analysis_request_mixed_options() {
        let request: AnalysisRequest = serde_json::from_value(json!({
            "url": "https://example.com",
            "options": { "mobile": true, "depth": 3, "weight": 0.5, "locale": "en-US" }
        }))
        .unwrap();

        assert_eq!(request.options["mobile"].as_bool(), Some(true));
        assert_eq!(request.options["depth"].as_f64(), Some(3.0));
        assert_eq!(request.options["weight"].as_f64(), Some(0.5));
        assert_eq!(request.options["locale"].as_str(), Some("en-US"));
    }

    #[test]
    fn test_analysis_request_rejects_nested_options() {
        let result: Result<AnalysisRequest, _> = serde_json::from_value(json!({
            "url": "https://example.com",
            "options": { "nested": { "a": 1 } }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_analysis_request_rejects_null_and_array_options() {
        for value in [json!(null), json!([1, 2])] {
            let result: Result<AnalysisRequest, _> = serde_json::from_value(json!({
                "url": "https://example.com",
                "options": { "a": value }
            }));
            assert!(result.is_err(), "accepted {value}");
        }
    }
}

mod response_tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            version: "1.0.0".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["timestamp"], "2024-01-15T10:30:00Z");
        assert_eq!(json["version"], "1.0.0");
    }

    #[test]
    fn test_root_response_links_docs() {
        let response = RootResponse {
            message: "Dev Agent Kit API".to_string(),
            version: "1.0.0".to_string(),
            docs: "/docs".to_string(),
            health: "/health".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["docs"], "/docs");
        assert_eq!(json["health"], "/health");
    }

    #[test]
    fn test_stream_event_serialization() {
        let json = serde_json::to_value(StreamEvent::now(4)).unwrap();
        assert_eq!(json["index"], 4);
        assert!(json["timestamp"].is_string());
    }
}

mod config_tests {
    use devkit_gateway::Config;

    #[test]
    fn test_server_addr_format() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 9000,
            ..Config::default()
        };
        assert_eq!(config.server_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.stream_event_count, 10);
        assert!(!config.has_credentials());
        assert!(!config.metrics_enabled());
    }
}
