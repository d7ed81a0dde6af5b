use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::expansion::{expand_with_profile, expand_with_suffixes, profile_names};
use crate::metrics::{EnrichedMetrics, EnrichmentCache, EnrichmentSources};
use crate::monetization::{MonetizationRow, Monetizer};
use crate::scoring::{KeywordScore, KeywordScorer, ScoringMode};
use crate::suggest::{collect_suggestions, SuggestionProvider};
use crate::text::{normalize, unique_ordered};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub seeds: Vec<String>,
    pub depth: u8,
    pub profile: Option<String>,
    pub include_suffixes: bool,
    /// Candidate list cap after collection; 0 keeps everything.
    pub max_candidates: usize,
    pub enrich: bool,
    pub enrich_limit: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            depth: 1,
            profile: None,
            include_suffixes: false,
            max_candidates: 0,
            enrich: false,
            enrich_limit: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub seeds: Vec<String>,
    pub candidates: Vec<String>,
    pub hit_counts: HashMap<String, u32>,
    pub scoring_mode: ScoringMode,
    pub scores: Vec<KeywordScore>,
    pub metrics: Option<HashMap<String, EnrichedMetrics>>,
    pub monetization: Vec<MonetizationRow>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AnalysisStage {
    Collecting { seeds: usize },
    Collected { candidates: usize },
    Enriching { done: usize, total: usize },
    Scoring,
    Done,
}

impl AnalysisStage {
    pub fn label(&self) -> &'static str {
        match self {
            AnalysisStage::Collecting { .. } => "collecting",
            AnalysisStage::Collected { .. } => "collected",
            AnalysisStage::Enriching { .. } => "enriching",
            AnalysisStage::Scoring => "scoring",
            AnalysisStage::Done => "done",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AnalysisStage::Collecting { seeds } => format!("Collecting suggestions for {} seeds", seeds),
            AnalysisStage::Collected { candidates } => format!("Collected {} candidates", candidates),
            AnalysisStage::Enriching { done, total } => format!("Enriched {}/{} keywords", done, total),
            AnalysisStage::Scoring => "Scoring keywords".to_string(),
            AnalysisStage::Done => "Analysis complete".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Analyzer {
    providers: Vec<Arc<dyn SuggestionProvider>>,
    sources: EnrichmentSources,
    cache: Option<Arc<EnrichmentCache>>,
    scorer: KeywordScorer,
    monetizer: Monetizer,
}

impl Analyzer {
    pub fn new(
        providers: Vec<Arc<dyn SuggestionProvider>>,
        sources: EnrichmentSources,
        config: &AppConfig,
    ) -> Self {
        Self {
            providers,
            sources,
            cache: None,
            scorer: KeywordScorer::new(config.scoring.clone()),
            monetizer: Monetizer::new(
                config.monetization.params.clone(),
                config.monetization.min_monthly,
                &config.monetization.exclude_tokens,
            ),
        }
    }

    pub fn with_cache(mut self, cache: Arc<EnrichmentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_monetizer(mut self, monetizer: Monetizer) -> Self {
        self.monetizer = monetizer;
        self
    }

    pub fn sources(&self) -> &EnrichmentSources {
        &self.sources
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisReport, String> {
        self.run_with_progress(request, |_| {}).await
    }

    pub async fn run_with_progress<F>(
        &self,
        request: &AnalysisRequest,
        mut on_stage: F,
    ) -> Result<AnalysisReport, String>
    where
        F: FnMut(AnalysisStage) + Send,
    {
        let seeds = unique_ordered(
            request
                .seeds
                .iter()
                .map(|seed| normalize(seed))
                .filter(|seed| !seed.is_empty()),
        );
        if seeds.is_empty() {
            return Err("at least one seed keyword is required".to_string());
        }
        if request.enrich && self.sources.is_empty() {
            return Err(crate::error::EnrichError::NoSources.to_string());
        }

        let mut warnings = Vec::new();
        if self.providers.is_empty() {
            warnings.push("no suggestion provider configured".to_string());
        }

        on_stage(AnalysisStage::Collecting { seeds: seeds.len() });
        let suggestions = collect_suggestions(&seeds, &self.providers, request.depth).await;
        let mut candidates = suggestions.candidates;

        match request.profile.as_deref().map(str::trim) {
            Some(profile) if !profile.is_empty() => {
                let expanded = expand_with_profile(&seeds, profile);
                if expanded.is_empty() {
                    warnings.push(format!(
                        "unknown expansion profile: {} (known: {})",
                        profile,
                        profile_names().join(", ")
                    ));
                }
                candidates = unique_ordered(candidates.into_iter().chain(expanded));
            }
            _ if request.include_suffixes => {
                candidates =
                    unique_ordered(candidates.into_iter().chain(expand_with_suffixes(&seeds, None)));
            }
            _ => {}
        }
        if request.max_candidates > 0 {
            candidates.truncate(request.max_candidates);
        }
        if candidates.is_empty() {
            warnings.push("no candidate keywords collected".to_string());
        }
        on_stage(AnalysisStage::Collected {
            candidates: candidates.len(),
        });

        let metrics = if request.enrich {
            let progress = |done: usize, total: usize, _: &str| {
                on_stage(AnalysisStage::Enriching { done, total });
            };
            let result = match &self.cache {
                Some(cache) => {
                    cache
                        .enrich_with_progress(&candidates, &self.sources, request.enrich_limit, progress)
                        .await
                }
                None => {
                    crate::metrics::enrich_keywords_with_progress(
                        &candidates,
                        &self.sources,
                        request.enrich_limit,
                        progress,
                    )
                    .await
                }
            };
            let metrics = result.map_err(|err| err.to_string())?;
            if !metrics.values().any(|entry| entry.monthly_volume() > 0) {
                warnings.push(
                    "no monthly search volume returned; set NAVER_AD_* for revenue estimates"
                        .to_string(),
                );
            }
            Some(metrics)
        } else {
            None
        };

        on_stage(AnalysisStage::Scoring);
        let scoring_mode = ScoringMode::select(metrics.as_ref());
        let scores = self
            .scorer
            .score(&candidates, &suggestions.hit_counts, metrics.as_ref());
        let monetization = metrics
            .as_ref()
            .map(|map| self.monetizer.monetize(&candidates, map))
            .unwrap_or_default();

        info!(
            seeds = seeds.len(),
            candidates = candidates.len(),
            mode = scoring_mode.label(),
            monetized = monetization.len(),
            "analysis complete"
        );
        on_stage(AnalysisStage::Done);

        Ok(AnalysisReport {
            seeds,
            candidates,
            hit_counts: suggestions.hit_counts,
            scoring_mode,
            scores,
            metrics,
            monetization,
            warnings,
        })
    }
}
