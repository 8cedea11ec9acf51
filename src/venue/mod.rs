pub mod binance;
pub mod bybit;
pub mod okx;

use crate::config::VenueConfig;
use crate::data::market_data::MarketDataClient;
use crate::models::Candle;
use crate::{Error, Result};
use serde_json::Value;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Selected once at startup and reused for the process lifetime.
pub enum VenueClient {
    Binance(binance::BinanceClient),
    Bybit(bybit::BybitClient),
    Okx(okx::OkxClient),
}

impl MarketDataClient for VenueClient {
    fn fetch_ohlcv(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>> {
        match self {
            VenueClient::Binance(client) => client.fetch_ohlcv(symbol, timeframe),
            VenueClient::Bybit(client) => client.fetch_ohlcv(symbol, timeframe),
            VenueClient::Okx(client) => client.fetch_ohlcv(symbol, timeframe),
        }
    }
}

pub fn client_from_config(config: &VenueConfig) -> Result<VenueClient> {
    match config.id.to_lowercase().as_str() {
        "binance" => {
            let base_url = config.base_url.clone().unwrap_or_else(|| {
                if config.sandbox {
                    binance::SANDBOX_BASE_URL.to_string()
                } else {
                    binance::DEFAULT_BASE_URL.to_string()
                }
            });
            let client = binance::BinanceClient::new(binance::BinanceConfig {
                base_url,
                api_key: config.api_key.clone(),
                limit: config.limit,
                timeout_secs: config.timeout_secs,
                min_request_interval_ms: config.min_request_interval_ms,
            })?;
            Ok(VenueClient::Binance(client))
        }
        "bybit" => {
            let base_url = config.base_url.clone().unwrap_or_else(|| {
                if config.sandbox {
                    bybit::SANDBOX_BASE_URL.to_string()
                } else {
                    bybit::DEFAULT_BASE_URL.to_string()
                }
            });
            let client = bybit::BybitClient::new(bybit::BybitConfig {
                base_url,
                limit: config.limit,
                timeout_secs: config.timeout_secs,
                min_request_interval_ms: config.min_request_interval_ms,
            })?;
            Ok(VenueClient::Bybit(client))
        }
        "okx" => {
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| okx::DEFAULT_BASE_URL.to_string());
            let client = okx::OkxClient::new(okx::OkxConfig {
                base_url,
                simulated: config.sandbox,
                limit: config.limit,
                timeout_secs: config.timeout_secs,
                min_request_interval_ms: config.min_request_interval_ms,
            })?;
            Ok(VenueClient::Okx(client))
        }
        other => Err(Error::new(format!("unsupported venue: {other}"))),
    }
}

/// Split a unified `BASE/QUOTE` pair into its legs.
pub fn split_pair(pair: &str) -> Result<(String, String)> {
    let mut parts = pair.splitn(2, '/');
    match (parts.next(), parts.next()) {
        (Some(base), Some(quote)) if !base.trim().is_empty() && !quote.trim().is_empty() => {
            Ok((base.trim().to_string(), quote.trim().to_string()))
        }
        _ => Err(Error::new(format!("invalid trading pair: {pair}"))),
    }
}

/// Minimum spacing between outbound requests, owned by the client handle.
pub(crate) struct Throttle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Throttle {
    pub(crate) fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval: Duration::from_millis(min_interval_ms),
            last_request: Mutex::new(None),
        }
    }

    pub(crate) fn pause(&self) {
        if self.min_interval.is_zero() {
            return;
        }
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

pub(crate) fn value_to_i64(value: &Value) -> Result<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| Error::new("number is not i64")),
        Value::String(text) => text
            .parse::<i64>()
            .map_err(|err| Error::new(format!("invalid i64: {err}"))),
        _ => Err(Error::new("unexpected value type for i64")),
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Result<f64> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| Error::new("number is not f64")),
        Value::String(text) => text
            .parse::<f64>()
            .map_err(|err| Error::new(format!("invalid f64: {err}"))),
        _ => Err(Error::new("unexpected value type for f64")),
    }
}
