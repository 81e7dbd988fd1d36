//! OpenAPI documentation.
//!
//! - `/docs` - Swagger UI
//! - `/redoc` - ReDoc
//! - `/openapi.json` - Raw OpenAPI document
//!
//! All three are public; the documented API routes still require a credential.

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ErrorEnvelope;
use crate::handlers;
use crate::models::{
    AnalysisRequest, AnalysisResponse, HealthResponse, OptionValue, RootResponse, StreamEvent,
    TodoItem, TodoListResponse,
};
use crate::state::AppState;

/// OpenAPI document for the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dev Agent Kit API",
        description = "Developer agent toolkit API: to-do items, SEO/AI-SEO/GEO analysis and an event stream",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::todos::create_todo,
        handlers::todos::list_todos,
        handlers::todos::get_todo,
        handlers::analysis::analyze_seo,
        handlers::analysis::analyze_ai_seo,
        handlers::analysis::analyze_geo,
        handlers::stream::stream_data,
    ),
    components(
        schemas(
            RootResponse,
            HealthResponse,
            TodoItem,
            TodoListResponse,
            AnalysisRequest,
            AnalysisResponse,
            OptionValue,
            StreamEvent,
            ErrorEnvelope,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service description and health"),
        (name = "todos", description = "To-do items"),
        (name = "analysis", description = "SEO, AI SEO and GEO analysis"),
        (name = "stream", description = "Server-sent event stream"),
    )
)]
pub struct ApiDoc;

/// Registers the two accepted credential schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
            );
        }
    }
}

/// Documentation routes, merged into the public route group.
pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .merge(Redoc::with_url("/redoc", ApiDoc::openapi()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn document() -> serde_json::Value {
        serde_json::from_str(&ApiDoc::openapi().to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_documents_every_route() {
        let doc = document();
        for path in [
            "/",
            "/health",
            "/api/todos",
            "/api/todos/{id}",
            "/api/seo/analyze",
            "/api/ai-seo/analyze",
            "/api/geo/analyze",
            "/api/stream",
        ] {
            assert!(doc["paths"].get(path).is_some(), "missing {path}");
        }
    }

    #[test]
    fn test_security_schemes() {
        let doc = document();
        let schemes = &doc["components"]["securitySchemes"];
        assert_eq!(schemes["bearer_auth"]["scheme"], "bearer");
        assert_eq!(schemes["api_key"]["name"], "X-API-Key");
        assert!(doc["paths"]["/health"]["get"].get("security").is_none());
        assert!(doc["paths"]["/api/todos"]["post"].get("security").is_some());
    }
}
