use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::AppResult;
use crate::models::AnalysisRequest;

/// Key of the aggregate score every analyzer must report.
pub const OVERALL_SCORE: &str = "overall";

/// Scores and recommendations produced by an [`Analyzer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Score per category, 0..=100
    pub scores: BTreeMap<String, u32>,
    /// Ordered, most important first
    pub recommendations: Vec<String>,
}

/// Analysis backend behind one of the `/api/*/analyze` routes.
pub trait Analyzer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn analyze(&self, request: &AnalysisRequest) -> AppResult<Analysis>;
}

/// Which analysis family a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Seo,
    AiSeo,
    Geo,
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnalysisKind::Seo => "seo",
            AnalysisKind::AiSeo => "ai-seo",
            AnalysisKind::Geo => "geo",
        })
    }
}

/// Analyzer returning a fixed overall score and recommendation list.
#[derive(Debug, Clone)]
pub struct StaticAnalyzer {
    name: &'static str,
    overall: u32,
    recommendations: &'static [&'static str],
}

impl StaticAnalyzer {
    pub const fn new(
        name: &'static str,
        overall: u32,
        recommendations: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            overall,
            recommendations,
        }
    }

    pub const SEO: Self = Self::new("seo", 85, &["Add meta tags", "Optimize keywords"]);

    pub const AI_SEO: Self = Self::new(
        "ai-seo",
        90,
        &["Run AI keyword research", "Optimize content for AI answers"],
    );

    pub const GEO: Self = Self::new(
        "geo",
        88,
        &["Add FAQ schema", "Optimize structured data"],
    );
}

impl Analyzer for StaticAnalyzer {
    fn name(&self) -> &'static str {
        self.name
    }

    #[instrument(skip(self, request), fields(analyzer = self.name, url = %request.url))]
    fn analyze(&self, request: &AnalysisRequest) -> AppResult<Analysis> {
        if !request.options.is_empty() {
            debug!(options = request.options.len(), "Static analyzer ignores options");
        }

        Ok(Analysis {
            scores: BTreeMap::from([(OVERALL_SCORE.to_string(), self.overall)]),
            recommendations: self
                .recommendations
                .iter()
                .map(|r| (*r).to_string())
                .collect(),
        })
    }
}

/// Analyzer per analysis family.
#[derive(Clone)]
pub struct AnalyzerRegistry {
    seo: Arc<dyn Analyzer>,
    ai_seo: Arc<dyn Analyzer>,
    geo: Arc<dyn Analyzer>,
}

impl AnalyzerRegistry {
    pub fn new(seo: Arc<dyn Analyzer>, ai_seo: Arc<dyn Analyzer>, geo: Arc<dyn Analyzer>) -> Self {
        Self { seo, ai_seo, geo }
    }

    pub fn get(&self, kind: AnalysisKind) -> &dyn Analyzer {
        match kind {
            AnalysisKind::Seo => self.seo.as_ref(),
            AnalysisKind::AiSeo => self.ai_seo.as_ref(),
            AnalysisKind::Geo => self.geo.as_ref(),
        }
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new(
            Arc::new(StaticAnalyzer::SEO),
            Arc::new(StaticAnalyzer::AI_SEO),
            Arc::new(StaticAnalyzer::GEO),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::AnalysisOptions;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            url: "https://example.com".to_string(),
            options: AnalysisOptions::new(),
        }
    }

    #[test]
    fn test_static_scores() {
        let registry = AnalyzerRegistry::default();
        let overall = |kind: AnalysisKind| {
            registry.get(kind).analyze(&request()).unwrap().scores[OVERALL_SCORE]
        };

        assert_eq!(overall(AnalysisKind::Seo), 85);
        assert_eq!(overall(AnalysisKind::AiSeo), 90);
        assert_eq!(overall(AnalysisKind::Geo), 88);
    }

    #[test]
    fn test_static_recommendations_non_empty() {
        let analysis = StaticAnalyzer::SEO.analyze(&request()).unwrap();
        assert_eq!(
            analysis.recommendations,
            vec!["Add meta tags".to_string(), "Optimize keywords".to_string()]
        );
    }

    #[test]
    fn test_registry_names() {
        let registry = AnalyzerRegistry::default();
        assert_eq!(registry.get(AnalysisKind::Geo).name(), "geo");
        assert_eq!(AnalysisKind::AiSeo.to_string(), "ai-seo");
    }
}
