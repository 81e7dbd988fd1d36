mod analyzer;

pub use analyzer::{
    Analysis, AnalysisKind, Analyzer, AnalyzerRegistry, OVERALL_SCORE, StaticAnalyzer,
};
