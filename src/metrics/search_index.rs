use async_trait::async_trait;
use serde::Deserialize;
use std::env;
use tracing::warn;

use crate::config::HttpConfig;
use crate::error::SourceError;
use crate::http::HttpClient;
use crate::metrics::SearchIndexSource;

const NAVER_BLOG_URL: &str = "https://openapi.naver.com/v1/search/blog.json";
const GOOGLE_CSE_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Clone)]
pub struct NaverBlogClient {
    http: HttpClient,
}

impl NaverBlogClient {
    pub fn from_env(config: &HttpConfig) -> Option<Self> {
        let client_id = env::var("NAVER_OPENAPI_CLIENT_ID").ok().filter(|v| !v.trim().is_empty())?;
        let client_secret = env::var("NAVER_OPENAPI_CLIENT_SECRET")
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        let headers = [
            ("X-Naver-Client-Id", client_id.trim()),
            ("X-Naver-Client-Secret", client_secret.trim()),
        ];
        match HttpClient::with_headers(config, &headers) {
            Ok(http) => Some(Self { http }),
            Err(err) => {
                warn!(error = %err, "Naver blog search client disabled");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct NaverBlogResponse {
    total: Option<u64>,
}

#[async_trait]
impl SearchIndexSource for NaverBlogClient {
    async fn total_results(&self, keyword: &str) -> Result<Option<u64>, SourceError> {
        let body: NaverBlogResponse = self
            .http
            .get_json(
                NAVER_BLOG_URL,
                &[("query", keyword.to_string()), ("display", "1".to_string())],
            )
            .await?;
        Ok(body.total)
    }
}

#[derive(Clone)]
pub struct GoogleCseClient {
    http: HttpClient,
    api_key: String,
    cx: String,
}

impl GoogleCseClient {
    pub fn from_env(config: &HttpConfig) -> Option<Self> {
        let api_key = env::var("GOOGLE_API_KEY").ok().filter(|v| !v.trim().is_empty())?;
        let cx = env::var("GOOGLE_CSE_CX").ok().filter(|v| !v.trim().is_empty())?;
        match HttpClient::from_config(config) {
            Ok(http) => Some(Self {
                http,
                api_key: api_key.trim().to_string(),
                cx: cx.trim().to_string(),
            }),
            Err(err) => {
                warn!(error = %err, "Google CSE client disabled");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct CseResponse {
    #[serde(rename = "searchInformation")]
    search_information: Option<CseSearchInformation>,
}

#[derive(Deserialize)]
struct CseSearchInformation {
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

#[async_trait]
impl SearchIndexSource for GoogleCseClient {
    async fn total_results(&self, keyword: &str) -> Result<Option<u64>, SourceError> {
        let body: CseResponse = self
            .http
            .get_json(
                GOOGLE_CSE_URL,
                &[
                    ("key", self.api_key.clone()),
                    ("cx", self.cx.clone()),
                    ("q", keyword.to_string()),
                ],
            )
            .await?;
        Ok(body
            .search_information
            .and_then(|info| info.total_results)
            .filter(|total| !total.is_empty() && total.chars().all(|ch| ch.is_ascii_digit()))
            .and_then(|total| total.parse().ok()))
    }
}
