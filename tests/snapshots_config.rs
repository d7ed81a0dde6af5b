use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use keyword_monetizer::config::{split_list, AppConfig};
use keyword_monetizer::error::SourceError;
use keyword_monetizer::snapshots::{seed_key, track_provider_trends, Snapshot, SnapshotStore};
use keyword_monetizer::suggest::SuggestionProvider;

struct StaticProvider {
    name: &'static str,
    items: Vec<&'static str>,
}

#[async_trait]
impl SuggestionProvider for StaticProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn suggest(&self, _seed: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.items.iter().map(|item| item.to_string()).collect())
    }
}

struct DownProvider;

#[async_trait]
impl SuggestionProvider for DownProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn suggest(&self, _seed: &str) -> Result<Vec<String>, SourceError> {
        Err(SourceError::Decode("connection reset".to_string()))
    }
}

fn provider(name: &'static str, items: Vec<&'static str>) -> Arc<dyn SuggestionProvider> {
    Arc::new(StaticProvider { name, items }) as Arc<dyn SuggestionProvider>
}

#[test]
fn seed_key_ignores_order_and_spacing() {
    let a = seed_key(&["제주  맛집".to_string(), "부산".to_string()]);
    let b = seed_key(&["부산".to_string(), " 제주 맛집".to_string(), "부산".to_string()]);
    assert_eq!(a, b);
    assert_eq!(a, "부산|제주 맛집");
}

#[tokio::test]
async fn store_keeps_newest_first_and_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshots.json");
    let seeds = vec!["제주".to_string()];

    let store = SnapshotStore::load(path.clone()).await.expect("load");
    assert!(store.latest("naver", &seed_key(&seeds)).await.is_none());

    store
        .add(Snapshot::new("naver", &seeds, vec!["제주 맛집".to_string()]))
        .await
        .expect("first");
    store
        .add(Snapshot::new("naver", &seeds, vec!["제주 핫플".to_string()]))
        .await
        .expect("second");
    store
        .add(Snapshot::new("naver", &["부산".to_string()], vec!["부산 야경".to_string()]))
        .await
        .expect("other seed");

    let latest = store.latest("naver", &seed_key(&seeds)).await.expect("latest");
    assert_eq!(latest.keywords, vec!["제주 핫플"]);
    assert!(store.latest("google", &seed_key(&seeds)).await.is_none());

    let reloaded = SnapshotStore::load(path).await.expect("reload");
    assert_eq!(reloaded.list().await, store.list().await);
    assert_eq!(reloaded.list().await.len(), 3);
}

#[tokio::test]
async fn store_caps_history() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::load(dir.path().join("snapshots.json"))
        .await
        .expect("load");
    let seeds = vec!["강릉".to_string()];
    for index in 0..55 {
        store
            .add(Snapshot::new("naver", &seeds, vec![format!("강릉 {}", index)]))
            .await
            .expect("add");
    }
    let list = store.list().await;
    assert_eq!(list.len(), 50);
    assert_eq!(list[0].keywords, vec!["강릉 54"]);
}

#[tokio::test]
async fn empty_collection_is_neither_diffed_nor_stored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshots.json");
    let store = SnapshotStore::load(path.clone()).await.expect("load");
    let seeds = vec!["제주".to_string()];
    let previous = vec!["제주 맛집".to_string(), "제주 카페".to_string()];

    let first = store
        .advance("naver", &seeds, previous.clone(), None)
        .await
        .expect("first pass");
    assert_eq!(first.new_suggestions, previous);

    let err = store
        .advance("naver", &seeds, Vec::new(), None)
        .await
        .expect_err("empty collection");
    assert!(err.contains("naver"));
    assert_eq!(store.list().await.len(), 1);

    let latest = store.latest("naver", &seed_key(&seeds)).await.expect("latest");
    assert_eq!(latest.keywords, previous);

    let reloaded = SnapshotStore::load(path).await.expect("reload");
    assert_eq!(reloaded.list().await.len(), 1);
}

#[tokio::test]
async fn providers_are_diffed_against_their_own_history() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::load(dir.path().join("snapshots.json"))
        .await
        .expect("load");
    let seeds = vec!["부산".to_string()];

    let providers = vec![
        provider("naver", vec!["부산 맛집", "부산 야경"]),
        provider("google", vec!["부산 여행"]),
    ];
    let run = track_provider_trends(&store, &providers, &seeds, 1, None)
        .await
        .expect("first run");
    assert_eq!(run.trends.len(), 2);
    assert!(run.warnings.is_empty());

    let providers = vec![
        provider("naver", vec!["부산 맛집", "부산 오션뷰"]),
        provider("google", vec!["부산 여행"]),
    ];
    let run = track_provider_trends(&store, &providers, &seeds, 1, None)
        .await
        .expect("second run");

    let naver = &run.trends[0];
    assert_eq!(naver.provider, "naver");
    assert_eq!(naver.delta.new_suggestions, vec!["부산 오션뷰"]);
    assert_eq!(naver.delta.dropped_suggestions, vec!["부산 야경"]);
    assert_eq!(naver.delta.hot_terms, vec![("오션뷰".to_string(), 1)]);

    let google = &run.trends[1];
    assert_eq!(google.provider, "google");
    assert!(google.delta.new_suggestions.is_empty());
    assert!(google.delta.dropped_suggestions.is_empty());
}

#[tokio::test]
async fn failing_provider_keeps_its_previous_snapshot() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::load(dir.path().join("snapshots.json"))
        .await
        .expect("load");
    let seeds = vec!["제주".to_string()];

    let up = vec![
        provider("naver", vec!["제주 맛집"]),
        provider("google", vec!["제주 렌트", "제주 카페"]),
    ];
    track_provider_trends(&store, &up, &seeds, 1, None)
        .await
        .expect("baseline");

    let partial = vec![
        provider("naver", vec!["제주 맛집"]),
        Arc::new(DownProvider) as Arc<dyn SuggestionProvider>,
    ];
    let run = track_provider_trends(&store, &partial, &seeds, 1, None)
        .await
        .expect("naver still answers");
    assert_eq!(run.trends.len(), 1);
    assert_eq!(run.trends[0].provider, "naver");
    assert_eq!(run.warnings.len(), 1);

    let google = store.latest("google", &seed_key(&seeds)).await.expect("google");
    assert_eq!(google.keywords, vec!["제주 렌트", "제주 카페"]);

    let down = vec![Arc::new(DownProvider) as Arc<dyn SuggestionProvider>];
    let err = track_provider_trends(&store, &down, &seeds, 2, None)
        .await
        .expect_err("nothing collected");
    assert!(err.contains("snapshots left unchanged"));
    assert_eq!(store.list().await.len(), 3);
}

#[test]
fn config_round_trips_through_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keywords.toml");
    let mut config = AppConfig::default();
    config.suggest.depth = 2;
    config.monetization.params.ecpm = 3100.0;
    config.monetization.exclude_tokens = vec!["광고".to_string()];
    config.write(&path).expect("write");

    let (loaded, loaded_path) = AppConfig::load(Some(path.clone())).expect("load");
    assert_eq!(loaded_path, Some(path));
    assert_eq!(loaded.suggest.depth, 2);
    assert_eq!(loaded.monetization.exclude_tokens, vec!["광고"]);
    assert_eq!(loaded.enrichment.limit, 30);
}

#[test]
fn partial_config_keeps_defaults() {
    let config: AppConfig = toml::from_str("[monetization]\nmin_monthly = 500\n").expect("parse");
    assert_eq!(config.monetization.min_monthly, 500);
    assert_eq!(config.monetization.params.capture_pct, 15.0);
    assert_eq!(config.suggest.providers, vec!["naver", "google"]);
    assert_eq!(config.log_filter(), "info");
}

#[test]
fn list_values_are_trimmed() {
    assert_eq!(split_list(" naver, ,google ,"), vec!["naver", "google"]);
    assert!(split_list("").is_empty());
}
