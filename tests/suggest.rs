use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use keyword_monetizer::config::{HttpConfig, SuggestConfig};
use keyword_monetizer::error::SourceError;
use keyword_monetizer::suggest::google::parse_google_suggestions;
use keyword_monetizer::suggest::naver::parse_naver_suggestions;
use keyword_monetizer::suggest::{
    build_providers, collect_longtail, collect_suggestions, longtail_prompts,
    SuggestionAggregator, SuggestionProvider,
};

struct FixedProvider {
    name: &'static str,
    answers: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn new(name: &'static str, answers: Vec<(&str, Vec<&str>)>) -> Self {
        Self {
            name,
            answers: answers
                .into_iter()
                .map(|(seed, items)| {
                    (
                        seed.to_string(),
                        items.iter().map(|item| item.to_string()).collect(),
                    )
                })
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SuggestionProvider for FixedProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn suggest(&self, seed: &str) -> Result<Vec<String>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answers.get(seed).cloned().unwrap_or_default())
    }
}

struct FailingProvider;

#[async_trait]
impl SuggestionProvider for FailingProvider {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn suggest(&self, _seed: &str) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Decode("connection reset".to_string()))
    }
}

#[test]
fn google_payload_is_cleaned() {
    let body = json!(["제주", ["제주 ", "제주  맛집", "", "제주 맛집", "제주 카페"], [], {}]);
    assert_eq!(
        parse_google_suggestions("제주", &body),
        vec!["제주 맛집", "제주 카페"]
    );
    assert!(parse_google_suggestions("제주", &json!({"unexpected": true})).is_empty());
}

#[test]
fn naver_payload_accepts_both_entry_shapes() {
    let body = json!({
        "query": ["제주"],
        "items": [
            [["제주 렌터카", "0"], ["제주 날씨"]],
            ["제주 맛집", 42, ["제주\t렌터카"]]
        ]
    });
    assert_eq!(
        parse_naver_suggestions("제주", &body),
        vec!["제주 렌터카", "제주 날씨", "제주 맛집"]
    );
    assert!(parse_naver_suggestions("제주", &json!({"items": "broken"})).is_empty());
}

#[test]
fn aggregator_counts_one_hit_per_batch() {
    let mut aggregator = SuggestionAggregator::new();
    aggregator.accumulate(vec!["a", "b"]);
    aggregator.accumulate(vec!["b", "c"]);
    let suggestions = aggregator.finish();

    assert_eq!(suggestions.candidates, vec!["a", "b", "c"]);
    assert_eq!(suggestions.hit_counts.get("b"), Some(&2));
    assert_eq!(suggestions.hit_counts.get("a"), Some(&1));
}

#[tokio::test]
async fn providers_merge_in_order_and_failures_are_absorbed() {
    let naver = Arc::new(FixedProvider::new(
        "naver",
        vec![("제주", vec!["제주 맛집", "제주 렌터카"])],
    ));
    let google = Arc::new(FixedProvider::new(
        "google",
        vec![("제주", vec!["제주 렌터카", "제주 날씨"])],
    ));
    let providers: Vec<Arc<dyn SuggestionProvider>> = vec![
        naver as Arc<dyn SuggestionProvider>,
        Arc::new(FailingProvider) as Arc<dyn SuggestionProvider>,
        google as Arc<dyn SuggestionProvider>,
    ];

    let suggestions = collect_suggestions(&["제주".to_string()], &providers, 1).await;

    assert_eq!(
        suggestions.candidates,
        vec!["제주 맛집", "제주 렌터카", "제주 날씨"]
    );
    assert_eq!(suggestions.hit_counts.get("제주 렌터카"), Some(&2));
    assert_eq!(suggestions.hit_counts.get("제주 날씨"), Some(&1));
}

#[tokio::test]
async fn deeper_collection_queries_expanded_seeds() {
    let provider = Arc::new(FixedProvider::new(
        "naver",
        vec![("제주", vec!["제주 맛집"]), ("제주 후기", vec!["제주 후기 모음"])],
    ));
    let providers: Vec<Arc<dyn SuggestionProvider>> = vec![provider.clone() as Arc<dyn SuggestionProvider>];

    let shallow = collect_suggestions(&["제주".to_string()], &providers, 1).await;
    assert_eq!(shallow.candidates, vec!["제주 맛집"]);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

    let deep = collect_suggestions(&["제주".to_string()], &providers, 2).await;
    assert_eq!(deep.candidates, vec!["제주 맛집", "제주 후기 모음"]);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1 + 1 + 10);
}

#[tokio::test]
async fn no_providers_yield_no_candidates() {
    let suggestions = collect_suggestions(&["제주".to_string()], &[], 2).await;
    assert!(suggestions.candidates.is_empty());
    assert!(suggestions.hit_counts.is_empty());
}

#[test]
fn unknown_provider_names_are_skipped() {
    let names = vec![
        "Naver".to_string(),
        "bing".to_string(),
        "naver".to_string(),
        " google ".to_string(),
    ];
    let providers = build_providers(&names, &SuggestConfig::default(), &HttpConfig::default())
        .expect("providers");
    let built: Vec<&str> = providers.iter().map(|provider| provider.name()).collect();
    assert_eq!(built, vec!["naver", "google"]);
}

#[test]
fn longtail_prompts_start_with_the_seed() {
    let modifiers = vec!["맛집", " ", "맛집", "카페  추천"];
    assert_eq!(
        longtail_prompts(" 제주 ", &modifiers),
        vec!["제주", "제주 맛집", "제주 카페 추천"]
    );
    assert!(longtail_prompts("  ", &modifiers).is_empty());
}

#[tokio::test]
async fn longtail_rows_rank_by_hits_and_remember_first_prompt() {
    let naver = Arc::new(FixedProvider::new(
        "naver",
        vec![
            ("제주", vec!["제주 맛집 추천", "제주 카페"]),
            ("제주 맛집", vec!["제주 맛집 추천", "제주 흑돼지"]),
        ],
    ));
    let google = Arc::new(FixedProvider::new(
        "google",
        vec![
            ("제주", vec!["제주 카페"]),
            ("제주 맛집", vec!["제주 흑돼지", "제주 맛집 추천"]),
        ],
    ));
    let providers = vec![
        naver.clone() as Arc<dyn SuggestionProvider>,
        google as Arc<dyn SuggestionProvider>,
        Arc::new(FailingProvider) as Arc<dyn SuggestionProvider>,
    ];
    let modifiers = vec!["맛집"];

    let rows = collect_longtail("제주", &modifiers, &providers, 1, 0).await;
    let ranked: Vec<(&str, u32)> = rows.iter().map(|row| (row.keyword.as_str(), row.hits)).collect();
    assert_eq!(
        ranked,
        vec![("제주 맛집 추천", 3), ("제주 흑돼지", 2), ("제주 카페", 2)]
    );
    assert_eq!(rows[0].prompt, "제주");
    assert_eq!(rows[0].provider, "naver");
    assert_eq!(rows[1].prompt, "제주 맛집");
    assert_eq!(naver.calls.load(Ordering::SeqCst), 2);

    let strong = collect_longtail("제주", &modifiers, &providers, 3, 0).await;
    assert_eq!(strong.len(), 1);
    assert_eq!(strong[0].keyword, "제주 맛집 추천");

    let capped = collect_longtail("제주", &modifiers, &providers, 1, 2).await;
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[1].keyword, "제주 흑돼지");
}
