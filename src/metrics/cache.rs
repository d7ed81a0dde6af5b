use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::EnrichError;
use crate::metrics::{enrich_keywords_with_progress, EnrichedMetrics, EnrichmentSources};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    keywords: Vec<String>,
    limit: Option<usize>,
    sources: Vec<&'static str>,
}

#[derive(Clone)]
struct CachedPass {
    metrics: HashMap<String, EnrichedMetrics>,
    expires_at: Instant,
}

/// Memoizes whole enrichment passes for `ttl`. A pass is reused only for the
/// exact same keyword list, cap and configured sources; failures are not cached.
pub struct EnrichmentCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CachedPass>>,
}

impl EnrichmentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn enrich(
        &self,
        keywords: &[String],
        sources: &EnrichmentSources,
        limit: Option<usize>,
    ) -> Result<HashMap<String, EnrichedMetrics>, EnrichError> {
        self.enrich_with_progress(keywords, sources, limit, |_, _, _| {})
            .await
    }

    pub async fn enrich_with_progress<F>(
        &self,
        keywords: &[String],
        sources: &EnrichmentSources,
        limit: Option<usize>,
        on_progress: F,
    ) -> Result<HashMap<String, EnrichedMetrics>, EnrichError>
    where
        F: FnMut(usize, usize, &str) + Send,
    {
        let key = CacheKey {
            keywords: keywords.to_vec(),
            limit: limit.filter(|value| *value > 0),
            sources: sources.names(),
        };

        let now = Instant::now();
        {
            let mut guard = self.entries.lock().await;
            guard.retain(|_, pass| now < pass.expires_at);
            if let Some(pass) = guard.get(&key) {
                debug!(keywords = keywords.len(), "enrichment cache hit");
                return Ok(pass.metrics.clone());
            }
        }

        debug!(keywords = keywords.len(), "enrichment cache miss");
        let metrics = enrich_keywords_with_progress(keywords, sources, limit, on_progress).await?;
        if !self.ttl.is_zero() {
            let mut guard = self.entries.lock().await;
            guard.insert(
                key,
                CachedPass {
                    metrics: metrics.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
        Ok(metrics)
    }

    pub async fn cached_passes(&self) -> usize {
        let guard = self.entries.lock().await;
        guard.len()
    }

    pub async fn clear(&self) {
        let mut guard = self.entries.lock().await;
        guard.clear();
    }
}
