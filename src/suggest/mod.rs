pub mod aggregator;
pub mod google;
pub mod longtail;
pub mod naver;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::config::{HttpConfig, SuggestConfig};
use crate::error::SourceError;
use crate::text::unique_ordered;

pub use aggregator::{collect_suggestions, SuggestionAggregator, Suggestions};
pub use google::GoogleSuggestProvider;
pub use longtail::{collect_longtail, longtail_prompts, LongTailRow, DEFAULT_MODIFIERS};
pub use naver::NaverSuggestProvider;

#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Normalized autocomplete entries for `seed`, excluding the seed itself.
    async fn suggest(&self, seed: &str) -> Result<Vec<String>, SourceError>;

    /// Suggestions for every seed, deduplicated. A failing seed contributes nothing.
    async fn bulk_suggest(&self, seeds: &[String]) -> Vec<String> {
        let mut out = Vec::new();
        for seed in seeds {
            match self.suggest(seed).await {
                Ok(items) => out.extend(items),
                Err(err) => warn!(provider = self.name(), seed = %seed, error = %err, "suggest failed"),
            }
        }
        unique_ordered(out)
    }
}

pub fn build_providers(
    names: &[String],
    suggest: &SuggestConfig,
    http: &HttpConfig,
) -> Result<Vec<Arc<dyn SuggestionProvider>>, SourceError> {
    let mut providers: Vec<Arc<dyn SuggestionProvider>> = Vec::new();
    for name in unique_ordered(names.iter().map(|name| name.trim().to_lowercase())) {
        match name.as_str() {
            "naver" => providers.push(Arc::new(NaverSuggestProvider::new(http)?)),
            "google" => providers.push(Arc::new(GoogleSuggestProvider::new(http, &suggest.hl)?)),
            other => warn!(provider = other, "unknown suggestion provider"),
        }
    }
    Ok(providers)
}

pub(crate) fn clean_suggestions<I>(seed: &str, raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    unique_ordered(
        raw.into_iter()
            .map(|item| crate::text::normalize(&item))
            .filter(|item| !item.is_empty() && item != seed),
    )
}
