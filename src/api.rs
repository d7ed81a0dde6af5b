use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use keyword_monetizer::config::AppConfig;
use keyword_monetizer::monetization::total_revenue;
use keyword_monetizer::outline::{build_outline, Outline};
use keyword_monetizer::{
    title_metas, AnalysisReport, AnalysisRequest, EnrichedMetrics, KeywordScore, MonetizationRow,
    ScoringMode, TitleMeta,
};

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub seeds: Option<Vec<String>>,
    pub request_id: Option<String>,
    pub depth: Option<u8>,
    pub profile: Option<String>,
    pub include_suffixes: Option<bool>,
    pub max_candidates: Option<usize>,
    pub enrich: Option<bool>,
    pub enrich_limit: Option<usize>,
    pub top: Option<usize>,
}

impl ApiAnalyzeRequest {
    pub fn into_request(self, config: &AppConfig) -> Result<AnalysisRequest, String> {
        let seeds: Vec<String> = self
            .seeds
            .unwrap_or_default()
            .into_iter()
            .map(|seed| seed.trim().to_string())
            .filter(|seed| !seed.is_empty())
            .collect();
        if seeds.is_empty() {
            return Err("seeds are required".to_string());
        }

        let mut request = AnalysisRequest::new(seeds);
        request.depth = self.depth.unwrap_or(config.suggest.depth).clamp(1, 3);
        request.profile = self.profile;
        request.include_suffixes = self.include_suffixes.unwrap_or(false);
        request.max_candidates = self.max_candidates.unwrap_or(0);
        request.enrich = self.enrich.unwrap_or(false);
        request.enrich_limit = self.enrich_limit.or(Some(config.enrichment.limit));
        Ok(request)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalyzeResponse {
    pub request_id: String,
    pub seeds: Vec<String>,
    pub scoring_mode: ScoringMode,
    pub candidate_count: usize,
    pub scores: Vec<KeywordScore>,
    pub metrics: Option<HashMap<String, EnrichedMetrics>>,
    pub monetization: Vec<MonetizationRow>,
    pub total_revenue: i64,
    pub outline: Option<Outline>,
    pub titles: Vec<TitleMeta>,
    pub warnings: Vec<String>,
}

impl ApiAnalyzeResponse {
    pub fn from_report(report: AnalysisReport, top: Option<usize>, request_id: String) -> Self {
        let top = top.filter(|value| *value > 0).unwrap_or(usize::MAX);
        let total_revenue = total_revenue(&report.monetization);
        let outline = report
            .monetization
            .first()
            .map(|row| row.keyword.as_str())
            .or_else(|| report.scores.first().map(|score| score.keyword.as_str()))
            .map(build_outline);
        let titles = if report.monetization.is_empty() {
            let metrics = report.metrics.as_ref();
            title_metas(report.scores.iter().take(top).map(|score| {
                let volume = metrics
                    .and_then(|map| map.get(&score.keyword))
                    .map(EnrichedMetrics::monthly_volume)
                    .unwrap_or(0);
                (score.keyword.as_str(), volume)
            }))
        } else {
            title_metas(
                report
                    .monetization
                    .iter()
                    .take(top)
                    .map(|row| (row.keyword.as_str(), row.monthly_search)),
            )
        };

        Self {
            request_id,
            seeds: report.seeds,
            scoring_mode: report.scoring_mode,
            candidate_count: report.candidates.len(),
            scores: report.scores.into_iter().take(top).collect(),
            metrics: report.metrics,
            monetization: report.monetization.into_iter().take(top).collect(),
            total_revenue,
            outline,
            titles,
            warnings: report.warnings,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiTrendsRequest {
    #[serde(default)]
    pub previous: Vec<String>,
    #[serde(default)]
    pub current: Vec<String>,
    pub hot_terms: Option<Vec<String>>,
}
