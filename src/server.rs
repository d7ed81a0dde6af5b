use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::sync::{broadcast, Mutex};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{info, warn};

use crate::api::{ApiAnalyzeRequest, ApiAnalyzeResponse, ApiTrendsRequest};
use keyword_monetizer::config::AppConfig;
use keyword_monetizer::error::EnrichError;
use keyword_monetizer::metrics::EnrichmentCache;
use keyword_monetizer::suggest::build_providers;
use keyword_monetizer::{compute_trends, AnalysisStage, Analyzer, EnrichmentSources, TrendDelta};

type Channels = Arc<Mutex<HashMap<String, broadcast::Sender<StreamEvent>>>>;

#[derive(Clone)]
struct AppState {
    analyzer: Analyzer,
    config: Arc<AppConfig>,
    channels: Channels,
}

#[derive(Clone, Serialize)]
struct StreamEvent {
    event: String,
    message: String,
    timestamp_ms: u128,
}

#[derive(serde::Deserialize)]
struct StreamQuery {
    request_id: String,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(args: crate::ServeArgs, config: AppConfig) -> Result<(), String> {
    let providers = build_providers(&config.suggest.providers, &config.suggest, &config.http)
        .map_err(|err| format!("failed to build providers: {}", err))?;
    let sources = EnrichmentSources::from_env(&config.http);
    let cache = Arc::new(EnrichmentCache::new(Duration::from_secs(
        config.enrichment.cache_ttl_secs,
    )));
    info!(
        providers = providers.len(),
        sources = ?sources.names(),
        cache_ttl_secs = cache.ttl().as_secs(),
        "starting keyword server"
    );

    let state = AppState {
        analyzer: Analyzer::new(providers, sources, &config).with_cache(cache),
        config: Arc::new(config),
        channels: Arc::new(Mutex::new(HashMap::new())),
    };

    let mut app = Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/stream", get(stream_handler))
        .route("/api/trends", post(trends_handler));
    if let Some(web_root) = args.web_root {
        let index_path = format!("{}/index.html", web_root.trim_end_matches('/'));
        let static_service = ServeDir::new(web_root).not_found_service(ServeFile::new(index_path));
        app = app.nest_service("/", static_service);
    }
    let app = app.with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;
    info!(%addr, "listening");

    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiAnalyzeRequest>,
) -> Result<Json<ApiAnalyzeResponse>, (StatusCode, String)> {
    let streamed = request.request_id.is_some();
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let top = request.top;
    let analysis = request
        .into_request(&state.config)
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;
    if analysis.enrich && state.analyzer.sources().is_empty() {
        return Err((StatusCode::BAD_REQUEST, EnrichError::NoSources.to_string()));
    }

    let channel = if streamed {
        Some(get_or_create_channel(&state.channels, &request_id).await)
    } else {
        None
    };

    let progress_sender = channel.clone();
    let result = state
        .analyzer
        .run_with_progress(&analysis, move |stage: AnalysisStage| {
            if let Some(sender) = progress_sender.as_ref() {
                send_event(sender, stage.label(), &stage.message());
            }
        })
        .await;

    if let Some(sender) = channel.as_ref() {
        if let Err(err) = &result {
            send_event(sender, "error", err);
        }
        schedule_cleanup(state.channels.clone(), request_id.clone());
    }

    let report = result.map_err(|err| {
        warn!(request_id = %request_id, error = %err, "analysis failed");
        (StatusCode::INTERNAL_SERVER_ERROR, err)
    })?;
    Ok(Json(ApiAnalyzeResponse::from_report(report, top, request_id)))
}

async fn trends_handler(Json(request): Json<ApiTrendsRequest>) -> Json<TrendDelta> {
    let hot_terms = request.hot_terms.unwrap_or_default();
    let hot_refs: Vec<&str> = hot_terms.iter().map(String::as_str).collect();
    Json(compute_trends(&request.previous, &request.current, Some(hot_refs.as_slice())))
}

async fn stream_handler(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>, StatusCode>
{
    let sender = get_or_create_channel(&state.channels, &query.request_id).await;
    let receiver = sender.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|event| match event {
        Ok(event) => {
            let data = serde_json::to_string(&event).unwrap_or_default();
            Some(Ok(Event::default().data(data)))
        }
        Err(_) => None,
    });

    send_event(&sender, "connected", "Streaming analysis progress");
    watch_stream_channel(state.channels.clone(), query.request_id);
    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(8))))
}

async fn get_or_create_channel(
    channels: &Channels,
    request_id: &str,
) -> broadcast::Sender<StreamEvent> {
    let mut guard = channels.lock().await;
    if let Some(sender) = guard.get(request_id) {
        return sender.clone();
    }
    let (sender, _) = broadcast::channel(64);
    guard.insert(request_id.to_string(), sender.clone());
    sender
}

fn send_event(sender: &broadcast::Sender<StreamEvent>, event: &str, message: &str) {
    let _ = sender.send(StreamEvent {
        event: event.to_string(),
        message: message.to_string(),
        timestamp_ms: now_ms(),
    });
}

fn schedule_cleanup(channels: Channels, request_id: String) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let mut guard = channels.lock().await;
        guard.remove(&request_id);
    });
}

/// Polls until the channel has no subscribers left, then drops it. Covers
/// streams that are opened without a matching analyze request.
fn watch_stream_channel(channels: Channels, request_id: String) {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(10)).await;
            if release_idle_channel(&channels, &request_id).await {
                break;
            }
        }
    });
}

async fn release_idle_channel(channels: &Channels, request_id: &str) -> bool {
    let mut guard = channels.lock().await;
    match guard.get(request_id) {
        Some(sender) if sender.receiver_count() > 0 => false,
        Some(_) => {
            guard.remove(request_id);
            true
        }
        None => true,
    }
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stream_channel_is_released_after_last_subscriber() {
        let channels: Channels = Arc::new(Mutex::new(HashMap::new()));
        let sender = get_or_create_channel(&channels, "req-1").await;
        let receiver = sender.subscribe();
        drop(sender);

        assert!(!release_idle_channel(&channels, "req-1").await);
        assert!(channels.lock().await.contains_key("req-1"));

        drop(receiver);
        assert!(release_idle_channel(&channels, "req-1").await);
        assert!(channels.lock().await.is_empty());
    }

    #[tokio::test]
    async fn missing_channel_counts_as_released() {
        let channels: Channels = Arc::new(Mutex::new(HashMap::new()));
        assert!(release_idle_channel(&channels, "req-unknown").await);

        let first = get_or_create_channel(&channels, "req-2").await;
        let second = get_or_create_channel(&channels, "req-2").await;
        assert!(first.same_channel(&second));
    }
}
