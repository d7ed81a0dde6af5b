use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::metrics::EnrichedMetrics;
use crate::scoring::{HeuristicScorer, InformedScorer, ScoringTunables};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordScore {
    pub keyword: String,
    pub demand: f64,
    pub competition: f64,
    pub opportunity: f64,
    pub provider_hits: u32,
}

impl KeywordScore {
    pub fn to_record(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut record = serde_json::Map::new();
        record.insert("keyword".to_string(), self.keyword.clone().into());
        record.insert("opportunity".to_string(), self.opportunity.into());
        record.insert("demand".to_string(), self.demand.into());
        record.insert("competition".to_string(), self.competition.into());
        record.insert("provider_hits".to_string(), self.provider_hits.into());
        record
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    Heuristic,
    Informed,
}

impl ScoringMode {
    pub fn select(metrics: Option<&HashMap<String, EnrichedMetrics>>) -> Self {
        match metrics {
            Some(map) if !map.is_empty() => ScoringMode::Informed,
            _ => ScoringMode::Heuristic,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoringMode::Heuristic => "heuristic",
            ScoringMode::Informed => "informed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordScorer {
    heuristic: HeuristicScorer,
    informed: InformedScorer,
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(ScoringTunables::default())
    }
}

impl KeywordScorer {
    pub fn new(tunables: ScoringTunables) -> Self {
        Self {
            heuristic: HeuristicScorer::new(),
            informed: InformedScorer::new(tunables),
        }
    }

    /// Scores every keyword and orders them by `(opportunity, demand)` descending.
    /// Keywords missing from `hit_counts` count as surfaced once.
    pub fn score<S: AsRef<str>>(
        &self,
        keywords: &[S],
        hit_counts: &HashMap<String, u32>,
        metrics: Option<&HashMap<String, EnrichedMetrics>>,
    ) -> Vec<KeywordScore> {
        let mode = ScoringMode::select(metrics);
        let mut scores: Vec<KeywordScore> = keywords
            .iter()
            .map(|keyword| {
                let keyword = keyword.as_ref();
                let hits = hit_counts.get(keyword).copied().unwrap_or(1);
                let heuristic = (
                    self.heuristic.demand(keyword, hits),
                    self.heuristic.competition(keyword),
                );
                let (demand, competition) = match mode {
                    ScoringMode::Heuristic => heuristic,
                    ScoringMode::Informed => self.informed.adjust(
                        heuristic,
                        hits,
                        metrics.and_then(|map| map.get(keyword)),
                    ),
                };
                let opportunity = self.informed.opportunity(demand, competition);
                KeywordScore {
                    keyword: keyword.to_string(),
                    demand: round3(demand),
                    competition: round3(competition),
                    opportunity: round3(opportunity),
                    provider_hits: hits,
                }
            })
            .collect();

        scores.sort_by(|a, b| {
            b.opportunity
                .partial_cmp(&a.opportunity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.demand.partial_cmp(&a.demand).unwrap_or(Ordering::Equal))
        });
        scores
    }
}

pub fn score_keywords<S: AsRef<str>>(
    keywords: &[S],
    hit_counts: &HashMap<String, u32>,
    metrics: Option<&HashMap<String, EnrichedMetrics>>,
) -> Vec<KeywordScore> {
    KeywordScorer::default().score(keywords, hit_counts, metrics)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
