pub mod analysis;
pub mod config;
pub mod error;
pub mod expansion;
pub mod http;
pub mod metrics;
pub mod monetization;
pub mod outline;
pub mod scoring;
pub mod snapshots;
pub mod suggest;
pub mod text;
pub mod titles;
pub mod trends;

pub use analysis::{AnalysisReport, AnalysisRequest, AnalysisStage, Analyzer};
pub use error::{EnrichError, SourceError};
pub use metrics::{enrich_keywords, EnrichedMetrics, EnrichmentSources};
pub use monetization::{monetize_keywords, Intent, MonetizationParams, MonetizationRow};
pub use scoring::{score_keywords, KeywordScore, ScoringMode};
pub use text::{normalize, tokenize, unique_ordered};
pub use titles::{title_meta_for, title_metas, TitleMeta};
pub use trends::{compute_trends, TrendDelta};

pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut result = String::new();
    for (index, ch) in digits.chars().rev().enumerate() {
        if index > 0 && index % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if value < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}

pub fn format_optional(value: Option<u64>) -> String {
    value
        .map(|value| format_number(value.min(i64::MAX as u64) as i64))
        .unwrap_or_else(|| "-".to_string())
}
