use serde::{Deserialize, Serialize};

use crate::metrics::EnrichedMetrics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTunables {
    pub demand_cap: f64,
    pub demand_base: f64,
    pub volume_log_weight: f64,
    pub hit_weight: f64,
    pub hit_cap: u32,
    pub index_base: f64,
    pub index_log_weight: f64,
    pub index_min: f64,
    pub index_max: f64,
    pub empty_index_competition: f64,
    pub competition_min: f64,
    pub competition_max: f64,
    pub opportunity_demand_weight: f64,
}

impl Default for ScoringTunables {
    fn default() -> Self {
        Self {
            demand_cap: 3.0,
            demand_base: 0.6,
            volume_log_weight: 0.6,
            hit_weight: 0.05,
            hit_cap: 5,
            index_base: 0.7,
            index_log_weight: 0.25,
            index_min: 0.6,
            index_max: 2.3,
            empty_index_competition: 0.8,
            competition_min: 0.5,
            competition_max: 2.5,
            opportunity_demand_weight: 1.4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InformedScorer {
    tunables: ScoringTunables,
}

impl InformedScorer {
    pub fn new(tunables: ScoringTunables) -> Self {
        Self { tunables }
    }

    /// Replaces heuristic demand/competition with metric-derived values where
    /// the metrics allow it. Returns the heuristic pair unchanged otherwise.
    pub fn adjust(
        &self,
        heuristic: (f64, f64),
        provider_hits: u32,
        metrics: Option<&EnrichedMetrics>,
    ) -> (f64, f64) {
        let Some(metrics) = metrics else {
            return heuristic;
        };
        let (heuristic_demand, heuristic_competition) = heuristic;

        let demand = match self.volume_demand(metrics.monthly_volume(), provider_hits) {
            Some(value) if value.is_finite() => value,
            _ => heuristic_demand,
        };

        let competition = match self.index_competition(metrics) {
            Some(value) if value.is_finite() => value,
            _ => heuristic_competition,
        };

        (demand, competition)
    }

    pub fn volume_demand(&self, monthly: u64, provider_hits: u32) -> Option<f64> {
        if monthly == 0 {
            return None;
        }
        let t = &self.tunables;
        let value = t.demand_base
            + (1.0 + monthly as f64).log10() * t.volume_log_weight
            + provider_hits.min(t.hit_cap) as f64 * t.hit_weight;
        Some(value.min(t.demand_cap))
    }

    pub fn index_competition(&self, metrics: &EnrichedMetrics) -> Option<f64> {
        let estimates: Vec<f64> = [metrics.naver_blog_total, metrics.google_total]
            .into_iter()
            .flatten()
            .map(|total| self.competition_from_total(total))
            .collect();
        if estimates.is_empty() {
            return None;
        }
        let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
        Some(
            mean.max(self.tunables.competition_min)
                .min(self.tunables.competition_max),
        )
    }

    pub fn competition_from_total(&self, total: u64) -> f64 {
        let t = &self.tunables;
        if total == 0 {
            return t.empty_index_competition;
        }
        let raw = t.index_base + (total as f64 + 1.0).log10() * t.index_log_weight;
        raw.max(t.index_min).min(t.index_max)
    }

    pub fn opportunity(&self, demand: f64, competition: f64) -> f64 {
        (demand * self.tunables.opportunity_demand_weight - competition).max(0.0)
    }
}
