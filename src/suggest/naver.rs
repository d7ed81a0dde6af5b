use async_trait::async_trait;
use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::SourceError;
use crate::http::HttpClient;
use crate::suggest::{clean_suggestions, SuggestionProvider};

const NAVER_SUGGEST_URL: &str = "https://ac.search.naver.com/nx/ac";

#[derive(Clone)]
pub struct NaverSuggestProvider {
    http: HttpClient,
}

impl NaverSuggestProvider {
    pub fn new(config: &HttpConfig) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpClient::from_config(config)?,
        })
    }
}

#[async_trait]
impl SuggestionProvider for NaverSuggestProvider {
    fn name(&self) -> &'static str {
        "naver"
    }

    async fn suggest(&self, seed: &str) -> Result<Vec<String>, SourceError> {
        let body: Value = self
            .http
            .get_json(
                NAVER_SUGGEST_URL,
                &[
                    ("q", seed.to_string()),
                    ("st", "100".to_string()),
                    ("r_format", "json".to_string()),
                    ("r_enc", "UTF-8".to_string()),
                    ("r_unicode", "0".to_string()),
                    ("t_koreng", "1".to_string()),
                    ("q_enc", "UTF-8".to_string()),
                ],
            )
            .await?;
        Ok(parse_naver_suggestions(seed, &body))
    }
}

/// `items` is a list of blocks; each block lists entries that are either a
/// bare string or an array whose first element is the suggestion.
pub fn parse_naver_suggestions(seed: &str, body: &Value) -> Vec<String> {
    let Some(blocks) = body.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut raw = Vec::new();
    for block in blocks.iter().filter_map(Value::as_array) {
        for entry in block {
            let text = match entry {
                Value::String(text) => Some(text.as_str()),
                Value::Array(parts) => parts.first().and_then(Value::as_str),
                _ => None,
            };
            if let Some(text) = text {
                raw.push(text.to_string());
            }
        }
    }
    clean_suggestions(seed, raw)
}
