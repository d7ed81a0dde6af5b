use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::warn;

use crate::suggest::{collect_suggestions, SuggestionProvider};
use crate::text::{normalize, unique_ordered};
use crate::trends::{compute_trends, TrendDelta};

const MAX_SNAPSHOTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub provider: String,
    pub seed_key: String,
    pub created_at_ms: u128,
    pub keywords: Vec<String>,
}

impl Snapshot {
    pub fn new(provider: &str, seeds: &[String], keywords: Vec<String>) -> Self {
        let created_at_ms = now_ms();
        let seed_key = seed_key(seeds);
        Self {
            id: format!("snap-{}-{}-{}", provider, created_at_ms, keywords.len()),
            provider: provider.to_string(),
            seed_key,
            created_at_ms,
            keywords,
        }
    }
}

/// Order-insensitive key for a seed set.
pub fn seed_key(seeds: &[String]) -> String {
    let mut seeds = unique_ordered(
        seeds
            .iter()
            .map(|seed| normalize(seed))
            .filter(|seed| !seed.is_empty()),
    );
    seeds.sort();
    seeds.join("|")
}

pub struct SnapshotStore {
    path: PathBuf,
    snapshots: Mutex<Vec<Snapshot>>,
}

impl SnapshotStore {
    pub async fn load(path: PathBuf) -> Result<Self, String> {
        let snapshots = if path.exists() {
            let data = tokio::fs::read_to_string(&path)
                .await
                .map_err(|err| format!("failed to read snapshots: {}", err))?;
            if data.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&data)
                    .map_err(|err| format!("failed to parse snapshots: {}", err))?
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            snapshots: Mutex::new(snapshots),
        })
    }

    pub async fn list(&self) -> Vec<Snapshot> {
        let guard = self.snapshots.lock().await;
        guard.clone()
    }

    pub async fn latest(&self, provider: &str, seed_key: &str) -> Option<Snapshot> {
        let guard = self.snapshots.lock().await;
        guard
            .iter()
            .find(|snapshot| snapshot.provider == provider && snapshot.seed_key == seed_key)
            .cloned()
    }

    /// Diffs `keywords` against the provider's previous snapshot for the same
    /// seeds, then stores them as the new latest. An empty collection means the
    /// provider gave no signal: it is neither diffed nor stored.
    pub async fn advance(
        &self,
        provider: &str,
        seeds: &[String],
        keywords: Vec<String>,
        hot_terms: Option<&[&str]>,
    ) -> Result<TrendDelta, String> {
        if keywords.is_empty() {
            return Err(format!(
                "no suggestions collected from {}; snapshot left unchanged",
                provider
            ));
        }
        let previous = self
            .latest(provider, &seed_key(seeds))
            .await
            .map(|snapshot| snapshot.keywords)
            .unwrap_or_default();
        let delta = compute_trends(&previous, &keywords, hot_terms);
        self.add(Snapshot::new(provider, seeds, keywords)).await?;
        Ok(delta)
    }

    pub async fn add(&self, snapshot: Snapshot) -> Result<Snapshot, String> {
        let mut guard = self.snapshots.lock().await;
        guard.insert(0, snapshot.clone());
        guard.truncate(MAX_SNAPSHOTS);
        self.persist(&guard).await?;
        Ok(snapshot)
    }

    async fn persist(&self, snapshots: &[Snapshot]) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent).await?;
        }
        let payload = serde_json::to_string_pretty(snapshots)
            .map_err(|err| format!("failed to serialize snapshots: {}", err))?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, payload)
            .await
            .map_err(|err| format!("failed to write snapshots: {}", err))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|err| format!("failed to finalize snapshots: {}", err))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderTrend {
    pub provider: String,
    #[serde(flatten)]
    pub delta: TrendDelta,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendRun {
    pub trends: Vec<ProviderTrend>,
    pub warnings: Vec<String>,
}

/// Collects each provider separately and advances its own snapshot. Fails
/// only when no provider returned anything.
pub async fn track_provider_trends(
    store: &SnapshotStore,
    providers: &[Arc<dyn SuggestionProvider>],
    seeds: &[String],
    depth: u8,
    hot_terms: Option<&[&str]>,
) -> Result<TrendRun, String> {
    let mut run = TrendRun::default();
    for provider in providers {
        let collected = collect_suggestions(seeds, std::slice::from_ref(provider), depth).await;
        match store
            .advance(provider.name(), seeds, collected.candidates, hot_terms)
            .await
        {
            Ok(delta) => run.trends.push(ProviderTrend {
                provider: provider.name().to_string(),
                delta,
            }),
            Err(err) => {
                warn!(provider = provider.name(), error = %err, "trend snapshot skipped");
                run.warnings.push(err);
            }
        }
    }
    if run.trends.is_empty() {
        return Err("no provider returned suggestions; snapshots left unchanged".to_string());
    }
    Ok(run)
}

async fn ensure_dir(path: &Path) -> Result<(), String> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|err| format!("failed to create snapshot dir: {}", err))
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
