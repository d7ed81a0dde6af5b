pub mod heuristic;
pub mod informed;
pub mod pipeline;

pub use heuristic::HeuristicScorer;
pub use informed::{InformedScorer, ScoringTunables};
pub use pipeline::{score_keywords, KeywordScore, KeywordScorer, ScoringMode};
