use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::expansion::expand_with_suffixes;
use crate::suggest::SuggestionProvider;
use crate::text::unique_ordered;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Suggestions {
    pub candidates: Vec<String>,
    pub hit_counts: HashMap<String, u32>,
}

/// Merges provider batches. Each batch a keyword appears in adds one hit.
#[derive(Debug, Default)]
pub struct SuggestionAggregator {
    candidates: Vec<String>,
    hit_counts: HashMap<String, u32>,
}

impl SuggestionAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate<I, S>(&mut self, batch: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for keyword in batch {
            let keyword = keyword.into();
            *self.hit_counts.entry(keyword.clone()).or_insert(0) += 1;
            self.candidates.push(keyword);
        }
    }

    pub fn finish(self) -> Suggestions {
        Suggestions {
            candidates: unique_ordered(self.candidates),
            hit_counts: self.hit_counts,
        }
    }
}

/// Queries every provider with the seeds; at depth >= 2 the generic
/// suffix-expanded seeds are queried as well.
pub async fn collect_suggestions(
    seeds: &[String],
    providers: &[Arc<dyn SuggestionProvider>],
    depth: u8,
) -> Suggestions {
    let mut aggregator = SuggestionAggregator::new();
    for provider in providers {
        aggregator.accumulate(provider.bulk_suggest(seeds).await);
    }

    if depth >= 2 {
        let expanded = expand_with_suffixes(seeds, None);
        for provider in providers {
            aggregator.accumulate(provider.bulk_suggest(&expanded).await);
        }
    }

    let suggestions = aggregator.finish();
    info!(
        seeds = seeds.len(),
        providers = providers.len(),
        candidates = suggestions.candidates.len(),
        "collected suggestions"
    );
    suggestions
}
