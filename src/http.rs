use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::SourceError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const DEFAULT_ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    max_retries: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl HttpClient {
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        Self::with_headers(config, &[])
    }

    pub fn with_headers(config: &HttpConfig, extra: &[(&str, &str)]) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
        );
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| SourceError::Setup(format!("invalid header name {}: {}", name, err)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| SourceError::Setup(format!("invalid header value: {}", err)))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| SourceError::Setup(format!("failed to build http client: {}", err)))?;

        let min_delay = Duration::from_millis(config.min_delay_ms);
        let max_delay = Duration::from_millis(config.max_delay_ms.max(config.min_delay_ms));
        Ok(Self {
            client,
            max_retries: config.max_retries,
            min_delay,
            max_delay,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        self.get_json_with(url, query, &[]).await
    }

    pub async fn get_json_with<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(String, String)],
    ) -> Result<T, SourceError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, query, headers).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries => {
                    attempt += 1;
                    debug!(url, attempt, error = %err, "retrying upstream request");
                    tokio::time::sleep(self.jitter()).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        headers: &[(String, String)],
    ) -> Result<T, SourceError> {
        let mut request = self.client.get(url).query(query);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status,
                detail: error_body.trim().to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| SourceError::Decode(err.to_string()))
    }

    fn jitter(&self) -> Duration {
        if self.max_delay <= self.min_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }
}
