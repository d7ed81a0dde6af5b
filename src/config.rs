use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::monetization::MonetizationParams;
use crate::scoring::ScoringTunables;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestConfig {
    pub providers: Vec<String>,
    pub depth: u8,
    pub hl: String,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            providers: vec!["naver".to_string(), "google".to_string()],
            depth: 1,
            hl: "ko".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Upper bound on keywords sent to paid/quota-limited sources; 0 means no cap.
    pub limit: usize,
    pub cache_ttl_secs: u64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            limit: 30,
            cache_ttl_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetizationConfig {
    pub params: MonetizationParams,
    pub min_monthly: u64,
    pub exclude_tokens: Vec<String>,
}

impl Default for MonetizationConfig {
    fn default() -> Self {
        Self {
            params: MonetizationParams::default(),
            min_monthly: 0,
            exclude_tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8000,
            max_retries: 2,
            min_delay_ms: 200,
            max_delay_ms: 700,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub suggest: SuggestConfig,
    pub enrichment: EnrichmentConfig,
    pub scoring: ScoringTunables,
    pub monetization: MonetizationConfig,
    pub http: HttpConfig,
}

impl AppConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    pub fn log_filter(&self) -> String {
        self.log_level
            .clone()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "info".to_string())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.log_level = Some(level);
            }
        }
        if let Ok(providers) = env::var("SUGGEST_PROVIDERS") {
            let parsed = split_list(&providers);
            if !parsed.is_empty() {
                self.suggest.providers = parsed;
            }
        }
        if let Some(value) = env_parse::<u8>("SUGGEST_DEPTH") {
            self.suggest.depth = value;
        }
        if let Some(value) = env_parse::<usize>("ENRICH_LIMIT") {
            self.enrichment.limit = value;
        }
        if let Some(value) = env_parse::<u64>("ENRICH_CACHE_TTL_SECS") {
            self.enrichment.cache_ttl_secs = value;
        }
        if let Some(value) = env_parse::<f64>("MONETIZE_CAPTURE_PCT") {
            self.monetization.params.capture_pct = value;
        }
        if let Some(value) = env_parse::<f64>("MONETIZE_PV_PER_VISIT") {
            self.monetization.params.pv_per_visit = value;
        }
        if let Some(value) = env_parse::<f64>("MONETIZE_ECPM") {
            self.monetization.params.ecpm = value;
        }
        if let Some(value) = env_parse::<f64>("MONETIZE_AFF_CVR_PCT") {
            self.monetization.params.aff_cvr_pct = value;
        }
        if let Some(value) = env_parse::<f64>("MONETIZE_AFF_COMMISSION") {
            self.monetization.params.aff_commission = value;
        }
        if let Some(value) = env_parse::<u64>("MONETIZE_MIN_MONTHLY") {
            self.monetization.min_monthly = value;
        }
        if let Ok(tokens) = env::var("MONETIZE_EXCLUDE") {
            self.monetization.exclude_tokens = split_list(&tokens);
        }
        if let Some(value) = env_parse::<u64>("HTTP_TIMEOUT_MS") {
            self.http.timeout_ms = value;
        }
        if let Some(value) = env_parse::<u32>("HTTP_MAX_RETRIES") {
            self.http.max_retries = value;
        }
    }
}

pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.trim().parse::<T>().ok())
}

fn default_config_path() -> Option<PathBuf> {
    env::var("KEYWORD_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/keywords.toml")))
}
