use async_trait::async_trait;
use serde_json::Value;

use crate::config::HttpConfig;
use crate::error::SourceError;
use crate::http::HttpClient;
use crate::suggest::{clean_suggestions, SuggestionProvider};

const GOOGLE_SUGGEST_URL: &str = "https://suggestqueries.google.com/complete/search";

#[derive(Clone)]
pub struct GoogleSuggestProvider {
    http: HttpClient,
    hl: String,
}

impl GoogleSuggestProvider {
    pub fn new(config: &HttpConfig, hl: &str) -> Result<Self, SourceError> {
        Ok(Self {
            http: HttpClient::from_config(config)?,
            hl: hl.to_string(),
        })
    }
}

#[async_trait]
impl SuggestionProvider for GoogleSuggestProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn suggest(&self, seed: &str) -> Result<Vec<String>, SourceError> {
        let body: Value = self
            .http
            .get_json(
                GOOGLE_SUGGEST_URL,
                &[
                    ("client", "firefox".to_string()),
                    ("q", seed.to_string()),
                    ("hl", self.hl.clone()),
                ],
            )
            .await?;
        Ok(parse_google_suggestions(seed, &body))
    }
}

pub fn parse_google_suggestions(seed: &str, body: &Value) -> Vec<String> {
    let Some(entries) = body.as_array().and_then(|items| items.get(1)).and_then(Value::as_array)
    else {
        return Vec::new();
    };
    clean_suggestions(
        seed,
        entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string),
    )
}
