use crate::app::metrics;
use crate::app::report::rfc3339;
use crate::config::Config;
use crate::data::fetcher::{FetchError, MarketDataFetcher};
use crate::venue::{self, VenueClient};
use crate::{Error, Result};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::spawn_blocking;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

struct ApiState {
    config: Config,
    fetcher: MarketDataFetcher<VenueClient>,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    venue: String,
    sandbox: bool,
    timestamp: i64,
}

#[derive(Serialize)]
struct CandleRow {
    timestamp_ms: i64,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Serialize)]
struct CandlesResponse {
    asset: String,
    symbol: String,
    timeframe: String,
    venue: String,
    candles: Vec<CandleRow>,
}

#[derive(Deserialize)]
struct CandlesQuery {
    asset: String,
    timeframe: Option<String>,
}

pub async fn run(addr: &str, config: Config) -> Result<()> {
    // The venue client is blocking; build and use it off the runtime.
    let venue_config = config.venue.clone();
    let client = spawn_blocking(move || venue::client_from_config(&venue_config))
        .await
        .map_err(|err| Error::new(format!("join failed: {err}")))??;
    let fetcher = MarketDataFetcher::new(config.tickers.crypto.clone(), client);
    let state = Arc::new(ApiState { config, fetcher });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/metrics", get(metrics_text))
        .route("/api/candles", get(candles))
        .with_state(state)
        .layer(cors);

    info!(addr = %addr, "api server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| Error::new(format!("bind failed: {err}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|err| Error::new(format!("server error: {err}")))?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(json!({ "message": "Welcome to the quantfeed market data API" }))
}

async fn health(State(state): State<Arc<ApiState>>) -> impl IntoResponse {
    let response = Health {
        status: "ok",
        venue: state.config.venue.id.clone(),
        sandbox: state.config.venue.sandbox,
        timestamp: now_epoch(),
    };
    Json(response)
}

async fn metrics_text() -> impl IntoResponse {
    metrics::render()
}

async fn candles(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<CandlesQuery>,
) -> impl IntoResponse {
    let timeframe = query
        .timeframe
        .unwrap_or_else(|| state.config.data.timeframe.clone());
    let asset = query.asset;

    let shared = state.clone();
    let fetch_timeframe = timeframe.clone();
    let fetch_asset = asset.clone();
    let result =
        spawn_blocking(move || shared.fetcher.fetch_candles(&fetch_asset, &fetch_timeframe)).await;

    match result {
        Ok(Ok(series)) => {
            metrics::record_success(series.len());
            let symbol = state
                .fetcher
                .symbol_for(&asset)
                .unwrap_or_default()
                .to_string();
            let rows = series
                .iter()
                .map(|candle| CandleRow {
                    timestamp_ms: candle.timestamp_ms,
                    time: rfc3339(candle.timestamp_ms),
                    open: candle.open,
                    high: candle.high,
                    low: candle.low,
                    close: candle.close,
                    volume: candle.volume,
                })
                .collect();
            Json(CandlesResponse {
                asset,
                symbol,
                timeframe,
                venue: state.config.venue.id.clone(),
                candles: rows,
            })
            .into_response()
        }
        Ok(Err(err)) => {
            match err {
                FetchError::UnknownAsset { .. } => metrics::record_unknown_asset(),
                FetchError::Venue { .. } => metrics::record_venue_error(),
            }
            fetch_error_status(&err).into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("join failed: {err}"),
        )
            .into_response(),
    }
}

fn fetch_error_status(err: &FetchError) -> (StatusCode, String) {
    match err {
        FetchError::UnknownAsset { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        FetchError::Venue { .. } => (StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}
