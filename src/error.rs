use thiserror::Error;

/// Failure of a single upstream call. Absorbed by the enricher and the
/// suggestion aggregator; never crosses a component boundary.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned {status}: {detail}")]
    Status {
        status: reqwest::StatusCode,
        detail: String,
    },

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("failed to sign request: {0}")]
    Signature(String),

    #[error("client setup failed: {0}")]
    Setup(String),
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("no enrichment source configured: set NAVER_AD_*, NAVER_OPENAPI_* or GOOGLE_* credentials")]
    NoSources,
}
