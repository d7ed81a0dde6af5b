use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use keyword_monetizer::error::{EnrichError, SourceError};
use keyword_monetizer::metrics::search_ad::{hint_keyword, parse_related, stats_for_keyword};
use keyword_monetizer::metrics::{
    enrich_keywords, enrich_keywords_with_progress, AdMetricsSource, EnrichmentCache,
    EnrichmentSources, KeywordStats, RelatedKeyword, SearchIndexSource,
};
use serde_json::json;

struct FakeAds {
    volumes: HashMap<String, (u64, u64)>,
    calls: AtomicUsize,
}

impl FakeAds {
    fn new(volumes: Vec<(&str, u64, u64)>) -> Self {
        Self {
            volumes: volumes
                .into_iter()
                .map(|(keyword, pc, mobile)| (keyword.to_string(), (pc, mobile)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AdMetricsSource for FakeAds {
    async fn keyword_stats(&self, keyword: &str) -> Result<KeywordStats, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.volumes.get(keyword) {
            Some((pc, mobile)) => Ok(KeywordStats {
                monthly_pc: Some(*pc),
                monthly_mobile: Some(*mobile),
                cpc: Some(320.0),
            }),
            None => Err(SourceError::Decode("keywordList missing".to_string())),
        }
    }

    async fn related_keywords(
        &self,
        _seed: &str,
        _max_rows: usize,
    ) -> Result<Vec<RelatedKeyword>, SourceError> {
        Ok(Vec::new())
    }
}

struct FakeIndex {
    total: Option<u64>,
    fail: bool,
}

#[async_trait]
impl SearchIndexSource for FakeIndex {
    async fn total_results(&self, _keyword: &str) -> Result<Option<u64>, SourceError> {
        if self.fail {
            return Err(SourceError::Decode("quota exceeded".to_string()));
        }
        Ok(self.total)
    }
}

fn keywords(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn no_sources_is_a_hard_error() {
    let result = enrich_keywords(&keywords(&["제주"]), &EnrichmentSources::default(), None).await;
    assert!(matches!(result, Err(EnrichError::NoSources)));
}

#[tokio::test]
async fn limit_caps_keywords_in_input_order() {
    let ads = Arc::new(FakeAds::new(vec![("a", 1, 2), ("b", 3, 4), ("c", 5, 6)]));
    let sources = EnrichmentSources {
        ad_metrics: Some(ads.clone() as Arc<dyn AdMetricsSource>),
        ..EnrichmentSources::default()
    };
    let input = keywords(&["a", "b", "c"]);

    let capped = enrich_keywords(&input, &sources, Some(2)).await.expect("enriched");
    assert_eq!(capped.len(), 2);
    assert!(capped.contains_key("a") && capped.contains_key("b"));
    assert_eq!(capped["b"].monthly_volume(), 7);

    let all = enrich_keywords(&input, &sources, Some(0)).await.expect("enriched");
    assert_eq!(all.len(), 3);
    assert_eq!(ads.calls.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn failing_source_only_blanks_its_fields() {
    let sources = EnrichmentSources {
        ad_metrics: Some(Arc::new(FakeAds::new(vec![("제주 맛집", 100, 900)])) as Arc<dyn AdMetricsSource>),
        naver_blog: Some(Arc::new(FakeIndex {
            total: Some(52_000),
            fail: false,
        }) as Arc<dyn SearchIndexSource>),
        google: Some(Arc::new(FakeIndex {
            total: None,
            fail: true,
        }) as Arc<dyn SearchIndexSource>),
    };
    let metrics = enrich_keywords(&keywords(&["제주 맛집", "제주 날씨"]), &sources, None)
        .await
        .expect("enriched");

    let hit = &metrics["제주 맛집"];
    assert_eq!(hit.naver_blog_total, Some(52_000));
    assert_eq!(hit.google_total, None);
    assert_eq!(hit.monthly_volume(), 1000);
    assert_eq!(hit.cpc, Some(320.0));

    let miss = &metrics["제주 날씨"];
    assert_eq!(miss.naver_blog_total, Some(52_000));
    assert_eq!(miss.monthly_pc, None);
    assert_eq!(miss.monthly_volume(), 0);
}

#[tokio::test]
async fn progress_reports_each_keyword() {
    let sources = EnrichmentSources {
        naver_blog: Some(Arc::new(FakeIndex {
            total: Some(10),
            fail: false,
        }) as Arc<dyn SearchIndexSource>),
        ..EnrichmentSources::default()
    };
    let mut seen = Vec::new();
    enrich_keywords_with_progress(&keywords(&["a", "b", "c"]), &sources, Some(2), |done, total, keyword| {
        seen.push((done, total, keyword.to_string()));
    })
    .await
    .expect("enriched");

    assert_eq!(seen, vec![(1, 2, "a".to_string()), (2, 2, "b".to_string())]);
}

#[tokio::test]
async fn cache_reuses_identical_passes() {
    let ads = Arc::new(FakeAds::new(vec![("a", 10, 20)]));
    let sources = EnrichmentSources {
        ad_metrics: Some(ads.clone() as Arc<dyn AdMetricsSource>),
        ..EnrichmentSources::default()
    };
    let cache = EnrichmentCache::new(Duration::from_secs(60));
    let input = keywords(&["a"]);

    let first = cache.enrich(&input, &sources, None).await.expect("first");
    let second = cache.enrich(&input, &sources, None).await.expect("second");
    assert_eq!(first, second);
    assert_eq!(ads.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.cached_passes().await, 1);

    cache.enrich(&input, &sources, Some(1)).await.expect("third");
    assert_eq!(ads.calls.load(Ordering::SeqCst), 2);

    cache.clear().await;
    assert_eq!(cache.cached_passes().await, 0);
}

#[tokio::test]
async fn zero_ttl_disables_caching() {
    let ads = Arc::new(FakeAds::new(vec![("a", 10, 20)]));
    let sources = EnrichmentSources {
        ad_metrics: Some(ads.clone() as Arc<dyn AdMetricsSource>),
        ..EnrichmentSources::default()
    };
    let cache = EnrichmentCache::new(Duration::ZERO);
    let input = keywords(&["a"]);

    cache.enrich(&input, &sources, None).await.expect("first");
    cache.enrich(&input, &sources, None).await.expect("second");
    assert_eq!(ads.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.cached_passes().await, 0);
}

#[tokio::test]
async fn cache_does_not_store_failures() {
    let cache = EnrichmentCache::new(Duration::from_secs(60));
    let result = cache
        .enrich(&keywords(&["a"]), &EnrichmentSources::default(), None)
        .await;
    assert!(result.is_err());
    assert_eq!(cache.cached_passes().await, 0);
}

#[test]
fn keyword_tool_rows_match_without_spaces() {
    let rows = vec![
        json!({"relKeyword": "제주렌터카추천", "monthlyPcQcCnt": 10, "monthlyMobileQcCnt": 20}),
        json!({"relKeyword": "제주렌터카", "monthlyPcQcCnt": 1200, "monthlyMobileQcCnt": "< 10", "plAvgCpc": 540.0}),
    ];
    assert_eq!(hint_keyword(" 제주 렌터카 "), "제주렌터카");

    let stats = stats_for_keyword("제주 렌터카", &rows);
    assert_eq!(stats.monthly_pc, Some(1200));
    assert_eq!(stats.monthly_mobile, None);
    assert_eq!(stats.cpc, Some(540.0));

    let fallback = stats_for_keyword("부산", &rows);
    assert_eq!(fallback.monthly_pc, Some(10));
    assert_eq!(stats_for_keyword("부산", &[]), KeywordStats::default());
}

#[test]
fn related_rows_parse_lenient_counts() {
    let row = json!({
        "relKeyword": " 제주 렌트 ",
        "monthlyPcQcCnt": "1,200",
        "monthlyMobileQcCnt": "< 10",
        "monthlyAvePcClkCnt": 12.5,
        "monthlyAveMobileClkCnt": "40",
        "plAvgCpc": 700,
        "compIdx": "높음"
    });
    let parsed = parse_related(&row).expect("row");
    assert_eq!(parsed.keyword, "제주 렌트");
    assert_eq!(parsed.monthly_pc, 1200);
    assert_eq!(parsed.monthly_mobile, 0);
    assert_eq!(parsed.clicks_pc, 12);
    assert_eq!(parsed.clicks_mobile, 40);
    assert_eq!(parsed.cpc, 700.0);
    assert_eq!(parsed.competition_index.as_deref(), Some("높음"));

    assert!(parse_related(&json!({"relKeyword": "  "})).is_none());
}
