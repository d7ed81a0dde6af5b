pub mod cache;
pub mod search_ad;
pub mod search_index;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::HttpConfig;
use crate::error::{EnrichError, SourceError};

pub use cache::EnrichmentCache;
pub use search_ad::{RelatedKeyword, SearchAdClient};
pub use search_index::{GoogleCseClient, NaverBlogClient};

/// Signals gathered for one keyword in one enrichment pass. `None` means the
/// source did not answer, which is distinct from a reported zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMetrics {
    pub keyword: String,
    pub naver_blog_total: Option<u64>,
    pub google_total: Option<u64>,
    pub monthly_pc: Option<u64>,
    pub monthly_mobile: Option<u64>,
    pub cpc: Option<f64>,
}

impl EnrichedMetrics {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    /// Desktop + mobile volume, with missing sides counted as zero.
    pub fn monthly_volume(&self) -> u64 {
        self.monthly_pc
            .unwrap_or(0)
            .saturating_add(self.monthly_mobile.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeywordStats {
    pub monthly_pc: Option<u64>,
    pub monthly_mobile: Option<u64>,
    pub cpc: Option<f64>,
}

#[async_trait]
pub trait AdMetricsSource: Send + Sync {
    async fn keyword_stats(&self, keyword: &str) -> Result<KeywordStats, SourceError>;

    async fn related_keywords(
        &self,
        seed: &str,
        max_rows: usize,
    ) -> Result<Vec<RelatedKeyword>, SourceError>;
}

#[async_trait]
pub trait SearchIndexSource: Send + Sync {
    async fn total_results(&self, keyword: &str) -> Result<Option<u64>, SourceError>;
}

/// Named enrichment slots. An empty slot means the credentials were not configured.
#[derive(Clone, Default)]
pub struct EnrichmentSources {
    pub ad_metrics: Option<Arc<dyn AdMetricsSource>>,
    pub naver_blog: Option<Arc<dyn SearchIndexSource>>,
    pub google: Option<Arc<dyn SearchIndexSource>>,
}

impl EnrichmentSources {
    pub fn from_env(http: &HttpConfig) -> Self {
        Self {
            ad_metrics: SearchAdClient::from_env(http)
                .map(|client| Arc::new(client) as Arc<dyn AdMetricsSource>),
            naver_blog: NaverBlogClient::from_env(http)
                .map(|client| Arc::new(client) as Arc<dyn SearchIndexSource>),
            google: GoogleCseClient::from_env(http)
                .map(|client| Arc::new(client) as Arc<dyn SearchIndexSource>),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ad_metrics.is_none() && self.naver_blog.is_none() && self.google.is_none()
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.ad_metrics.is_some() {
            names.push("naver_ads");
        }
        if self.naver_blog.is_some() {
            names.push("naver_openapi");
        }
        if self.google.is_some() {
            names.push("google_cse");
        }
        names
    }
}

pub async fn enrich_keywords(
    keywords: &[String],
    sources: &EnrichmentSources,
    limit: Option<usize>,
) -> Result<HashMap<String, EnrichedMetrics>, EnrichError> {
    enrich_keywords_with_progress(keywords, sources, limit, |_, _, _| {}).await
}

/// Enriches keywords in input order, one source call at a time. Keywords past
/// `limit` are left out of the map; a failing source only blanks its own fields.
pub async fn enrich_keywords_with_progress<F>(
    keywords: &[String],
    sources: &EnrichmentSources,
    limit: Option<usize>,
    mut on_progress: F,
) -> Result<HashMap<String, EnrichedMetrics>, EnrichError>
where
    F: FnMut(usize, usize, &str) + Send,
{
    if sources.is_empty() {
        return Err(EnrichError::NoSources);
    }

    let cap = match limit {
        Some(value) if value > 0 => value.min(keywords.len()),
        _ => keywords.len(),
    };

    let mut out = HashMap::with_capacity(cap);
    for (index, keyword) in keywords.iter().take(cap).enumerate() {
        let mut metrics = EnrichedMetrics::new(keyword.clone());

        if let Some(source) = &sources.naver_blog {
            metrics.naver_blog_total = absorb("naver_openapi", keyword, source.total_results(keyword).await)
                .flatten();
        }
        if let Some(source) = &sources.google {
            metrics.google_total = absorb("google_cse", keyword, source.total_results(keyword).await)
                .flatten();
        }
        if let Some(source) = &sources.ad_metrics {
            if let Some(stats) = absorb("naver_ads", keyword, source.keyword_stats(keyword).await) {
                metrics.monthly_pc = stats.monthly_pc;
                metrics.monthly_mobile = stats.monthly_mobile;
                metrics.cpc = stats.cpc;
            }
        }

        debug!(keyword = %keyword, ?metrics, "enriched keyword");
        on_progress(index + 1, cap, keyword);
        out.insert(keyword.clone(), metrics);
    }

    info!(
        enriched = out.len(),
        requested = keywords.len(),
        sources = ?sources.names(),
        "enrichment pass complete"
    );
    Ok(out)
}

fn absorb<T>(source: &str, keyword: &str, result: Result<T, SourceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(source, keyword, error = %err, "enrichment source failed");
            None
        }
    }
}
