use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::suggest::SuggestionProvider;
use crate::text::{normalize, unique_ordered};

pub const DEFAULT_MODIFIERS: &[&str] = &[
    "추천", "후기", "비교", "방법", "팁", "체크리스트", "가성비", "예약", "메뉴", "가격", "브런치",
    "카페",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTailRow {
    pub keyword: String,
    /// Number of prompt/provider answers that contained the keyword.
    pub hits: u32,
    pub prompt: String,
    pub provider: String,
}

pub fn longtail_prompts<S: AsRef<str>>(seed: &str, modifiers: &[S]) -> Vec<String> {
    let seed = normalize(seed);
    if seed.is_empty() {
        return Vec::new();
    }
    let mut prompts = vec![seed.clone()];
    for modifier in modifiers {
        let modifier = normalize(modifier.as_ref());
        if !modifier.is_empty() {
            prompts.push(format!("{} {}", seed, modifier));
        }
    }
    unique_ordered(prompts)
}

/// Queries every prompt against every provider and ranks what came back by
/// hit count, highest first (ties by keyword, also descending). Rows under
/// `min_hits` are dropped before `limit` applies; a zero limit keeps all rows.
pub async fn collect_longtail<S: AsRef<str>>(
    seed: &str,
    modifiers: &[S],
    providers: &[Arc<dyn SuggestionProvider>],
    min_hits: u32,
    limit: usize,
) -> Vec<LongTailRow> {
    let prompts = longtail_prompts(seed, modifiers);
    let mut rows: HashMap<String, LongTailRow> = HashMap::new();

    for prompt in &prompts {
        for provider in providers {
            let items = match provider.suggest(prompt).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(provider = provider.name(), prompt = %prompt, error = %err, "long-tail prompt failed");
                    continue;
                }
            };
            for keyword in unique_ordered(items) {
                rows.entry(keyword.clone())
                    .and_modify(|row| row.hits += 1)
                    .or_insert_with(|| LongTailRow {
                        keyword,
                        hits: 1,
                        prompt: prompt.clone(),
                        provider: provider.name().to_string(),
                    });
            }
        }
    }

    let mut rows: Vec<LongTailRow> = rows
        .into_values()
        .filter(|row| row.hits >= min_hits)
        .collect();
    rows.sort_by(|a, b| match b.hits.cmp(&a.hits) {
        Ordering::Equal => b.keyword.cmp(&a.keyword),
        other => other,
    });
    if limit > 0 {
        rows.truncate(limit);
    }
    info!(
        prompts = prompts.len(),
        providers = providers.len(),
        rows = rows.len(),
        "collected long-tail suggestions"
    );
    rows
}
