//! Analysis endpoints.
//!
//! # Endpoints
//!
//! - `POST /api/seo/analyze` - SEO analysis
//! - `POST /api/ai-seo/analyze` - AI-assisted SEO analysis
//! - `POST /api/geo/analyze` - Generative engine optimization analysis
//!
//! All three accept the same body and answer with the same shape:
//!
//! ```json
//! { "url": "https://example.com", "options": { "depth": 2 } }
//! ```

use axum::Json;
use axum::extract::{Extension, State};
use chrono::Utc;
use tracing::{error, info, instrument};

use crate::error::{AppError, AppResult, ErrorEnvelope};
use crate::middleware::AuthenticatedKey;
use crate::models::{AnalysisRequest, AnalysisResponse};
use crate::services::{AnalysisKind, OVERALL_SCORE};
use crate::state::AppState;

/// SEO analysis.
#[utoipa::path(
    post,
    path = "/api/seo/analyze",
    tag = "analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Analysis result", body = AnalysisResponse),
        (status = 401, description = "No credential", body = ErrorEnvelope),
        (status = 403, description = "Credential not accepted", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
#[instrument(skip_all, fields(key = %key.masked(), url = %request.url))]
pub async fn analyze_seo(
    State(state): State<AppState>,
    Extension(key): Extension<AuthenticatedKey>,
    Json(request): Json<AnalysisRequest>,
) -> AppResult<Json<AnalysisResponse>> {
    run_analysis(&state, AnalysisKind::Seo, request).map(Json)
}

/// AI-assisted SEO analysis.
#[utoipa::path(
    post,
    path = "/api/ai-seo/analyze",
    tag = "analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Analysis result", body = AnalysisResponse),
        (status = 401, description = "No credential", body = ErrorEnvelope),
        (status = 403, description = "Credential not accepted", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
#[instrument(skip_all, fields(key = %key.masked(), url = %request.url))]
pub async fn analyze_ai_seo(
    State(state): State<AppState>,
    Extension(key): Extension<AuthenticatedKey>,
    Json(request): Json<AnalysisRequest>,
) -> AppResult<Json<AnalysisResponse>> {
    run_analysis(&state, AnalysisKind::AiSeo, request).map(Json)
}

/// Generative engine optimization analysis.
#[utoipa::path(
    post,
    path = "/api/geo/analyze",
    tag = "analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Analysis result", body = AnalysisResponse),
        (status = 401, description = "No credential", body = ErrorEnvelope),
        (status = 403, description = "Credential not accepted", body = ErrorEnvelope)
    ),
    security(("bearer_auth" = []), ("api_key" = []))
)]
#[instrument(skip_all, fields(key = %key.masked(), url = %request.url))]
pub async fn analyze_geo(
    State(state): State<AppState>,
    Extension(key): Extension<AuthenticatedKey>,
    Json(request): Json<AnalysisRequest>,
) -> AppResult<Json<AnalysisResponse>> {
    run_analysis(&state, AnalysisKind::Geo, request).map(Json)
}

/// Run the analyzer for `kind` and stamp the result.
fn run_analysis(
    state: &AppState,
    kind: AnalysisKind,
    request: AnalysisRequest,
) -> AppResult<AnalysisResponse> {
    let analyzer = state.analyzers.get(kind);
    let analysis = analyzer.analyze(&request)?;

    // Every analysis response carries an overall score.
    let Some(overall) = analysis.scores.get(OVERALL_SCORE).copied() else {
        error!(analyzer = analyzer.name(), "Analyzer returned no overall score");
        return Err(AppError::Internal(format!(
            "{kind} analyzer returned no overall score"
        )));
    };

    info!(%kind, overall, "Analysis complete");

    Ok(AnalysisResponse {
        url: request.url,
        timestamp: Utc::now(),
        scores: analysis.scores,
        recommendations: analysis.recommendations,
    })
}
