use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::Sha256;
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::config::HttpConfig;
use crate::error::SourceError;
use crate::http::HttpClient;
use crate::metrics::{AdMetricsSource, KeywordStats};

type HmacSha256 = Hmac<Sha256>;

const SEARCH_AD_BASE: &str = "https://api.searchad.naver.com";
const KEYWORD_TOOL_PATH: &str = "/keywordstool";

/// One row of the SearchAd keyword tool. Counts reported as "< 10" read as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedKeyword {
    pub keyword: String,
    pub monthly_pc: u64,
    pub monthly_mobile: u64,
    pub clicks_pc: u64,
    pub clicks_mobile: u64,
    pub cpc: f64,
    pub competition_index: Option<String>,
}

#[derive(Clone)]
pub struct SearchAdClient {
    http: HttpClient,
    api_base: String,
    customer_id: String,
    api_key: String,
    secret_key: String,
}

impl SearchAdClient {
    pub fn from_env(config: &HttpConfig) -> Option<Self> {
        let customer_id = non_empty_env("NAVER_AD_CUSTOMER_ID")?;
        let api_key = non_empty_env("NAVER_AD_API_KEY")?;
        let secret_key = non_empty_env("NAVER_AD_SECRET_KEY")?;
        let api_base = env::var("NAVER_AD_API_BASE").unwrap_or_else(|_| SEARCH_AD_BASE.to_string());
        match HttpClient::from_config(config) {
            Ok(http) => Some(Self {
                http,
                api_base,
                customer_id,
                api_key,
                secret_key,
            }),
            Err(err) => {
                warn!(error = %err, "SearchAd client disabled");
                None
            }
        }
    }

    /// Signs `{timestamp}.{method}.{path}` with the secret key, base64-encoded.
    pub fn sign(&self, timestamp: &str, method: &str, path: &str) -> Result<String, SourceError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .map_err(|err| SourceError::Signature(err.to_string()))?;
        mac.update(format!("{}.{}.{}", timestamp, method, path).as_bytes());
        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn signed_headers(&self, method: &str, path: &str) -> Result<Vec<(String, String)>, SourceError> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis())
            .unwrap_or(0)
            .to_string();
        let signature = self.sign(&timestamp, method, path)?;
        Ok(vec![
            ("X-Timestamp".to_string(), timestamp),
            ("X-API-KEY".to_string(), self.api_key.clone()),
            ("X-Customer".to_string(), self.customer_id.clone()),
            ("X-Signature".to_string(), signature),
        ])
    }

    async fn keyword_tool(&self, hint: &str) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}{}", self.api_base.trim_end_matches('/'), KEYWORD_TOOL_PATH);
        let headers = self.signed_headers("GET", KEYWORD_TOOL_PATH)?;
        let body: Value = self
            .http
            .get_json_with(
                &url,
                &[
                    ("hintKeywords", hint_keyword(hint)),
                    ("showDetail", "1".to_string()),
                ],
                &headers,
            )
            .await?;
        match body.get("keywordList") {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(SourceError::Decode("keywordList is not an array".to_string())),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl AdMetricsSource for SearchAdClient {
    async fn keyword_stats(&self, keyword: &str) -> Result<KeywordStats, SourceError> {
        let items = self.keyword_tool(keyword).await?;
        Ok(stats_for_keyword(keyword, &items))
    }

    async fn related_keywords(
        &self,
        seed: &str,
        max_rows: usize,
    ) -> Result<Vec<RelatedKeyword>, SourceError> {
        let items = self.keyword_tool(seed).await?;
        Ok(items
            .iter()
            .filter_map(parse_related)
            .take(max_rows)
            .collect())
    }
}

/// The keyword tool rejects spaces inside hint keywords.
pub fn hint_keyword(keyword: &str) -> String {
    keyword.split_whitespace().collect::<String>()
}

/// Picks the row whose `relKeyword` matches the query (spaces ignored),
/// falling back to the first row. Non-numeric counts read as absent.
pub fn stats_for_keyword(keyword: &str, items: &[Value]) -> KeywordStats {
    let wanted = hint_keyword(keyword);
    let item = items
        .iter()
        .find(|item| {
            item.get("relKeyword")
                .and_then(Value::as_str)
                .map(|rel| hint_keyword(rel) == wanted)
                .unwrap_or(false)
        })
        .or_else(|| items.first());

    let Some(item) = item else {
        return KeywordStats::default();
    };

    KeywordStats {
        monthly_pc: item.get("monthlyPcQcCnt").and_then(strict_count),
        monthly_mobile: item.get("monthlyMobileQcCnt").and_then(strict_count),
        cpc: item.get("plAvgCpc").and_then(Value::as_f64),
    }
}

pub fn parse_related(item: &Value) -> Option<RelatedKeyword> {
    let keyword = item.get("relKeyword")?.as_str()?.trim().to_string();
    if keyword.is_empty() {
        return None;
    }
    Some(RelatedKeyword {
        keyword,
        monthly_pc: lenient_count(item.get("monthlyPcQcCnt")),
        monthly_mobile: lenient_count(item.get("monthlyMobileQcCnt")),
        clicks_pc: lenient_count(item.get("monthlyAvePcClkCnt")),
        clicks_mobile: lenient_count(item.get("monthlyAveMobileClkCnt")),
        cpc: item.get("plAvgCpc").and_then(Value::as_f64).unwrap_or(0.0),
        competition_index: item
            .get("compIdx")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

fn strict_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64)),
        Value::String(text) if !text.is_empty() && text.chars().all(|ch| ch.is_ascii_digit()) => {
            text.parse().ok()
        }
        _ => None,
    }
}

fn lenient_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::String(text)) => text
            .replace(',', "")
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
            .unwrap_or(0),
        Some(other) => strict_count(other).unwrap_or(0),
        None => 0,
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
