use crate::text::token_count;

const DEMAND_CAP: f64 = 3.0;
const HIT_CAP: u32 = 5;

#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn demand(&self, keyword: &str, provider_hits: u32) -> f64 {
        let tokens = token_count(keyword);
        let base = if (2..=5).contains(&tokens) { 1.0 } else { 0.6 };
        let boosted = base * (1.0 + provider_hits.min(HIT_CAP) as f64 * 0.1);
        boosted.min(DEMAND_CAP)
    }

    /// Single-word queries are treated as head terms; longer ones taper to 0.5.
    pub fn competition(&self, keyword: &str) -> f64 {
        let tokens = token_count(keyword);
        if tokens <= 1 {
            return 2.0;
        }
        let extra = (tokens - 2).min(4) as f64;
        (1.5 - extra * 0.12).max(0.5)
    }
}
