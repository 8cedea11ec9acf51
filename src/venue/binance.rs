use crate::data::market_data::MarketDataClient;
use crate::models::Candle;
use crate::venue::{split_pair, value_to_f64, value_to_i64, Throttle};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
pub const SANDBOX_BASE_URL: &str = "https://testnet.binance.vision";

const MAX_LIMIT: u32 = 1000;

#[derive(Clone, Debug)]
pub struct BinanceConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub limit: Option<u32>,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

pub struct BinanceClient {
    client: Client,
    config: BinanceConfig,
    throttle: Throttle,
}

impl BinanceClient {
    pub fn new(config: BinanceConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::new("base_url must be set"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| Error::new(format!("http client build failed: {err}")))?;
        let throttle = Throttle::new(config.min_request_interval_ms);
        Ok(Self {
            client,
            config,
            throttle,
        })
    }

    fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.throttle.pause();
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.client.get(url).query(query);
        if let Some(api_key) = self.config.api_key.as_deref() {
            request = request.header("X-MBX-APIKEY", api_key);
        }
        let response = request
            .send()
            .map_err(|err| Error::new(format!("http request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(Error::new(format!(
                "binance response status: {}",
                response.status()
            )));
        }
        response
            .json::<Value>()
            .map_err(|err| Error::new(format!("json parse failed: {err}")))
    }
}

impl MarketDataClient for BinanceClient {
    fn fetch_ohlcv(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>> {
        let venue_symbol = venue_symbol(symbol)?;
        // Interval tokens are forwarded untouched; the venue rejects ones it
        // does not support.
        let mut query = vec![
            ("symbol".to_string(), venue_symbol),
            ("interval".to_string(), timeframe.to_string()),
        ];
        if let Some(limit) = self.config.limit {
            query.push(("limit".to_string(), limit.min(MAX_LIMIT).to_string()));
        }
        let payload = self.get_json("/api/v3/klines", &query)?;
        parse_klines(&payload)
    }
}

/// `SOL/USDT` -> `SOLUSDT`.
pub fn venue_symbol(pair: &str) -> Result<String> {
    let (base, quote) = split_pair(pair)?;
    Ok(format!("{base}{quote}"))
}

pub fn parse_klines(payload: &Value) -> Result<Vec<Candle>> {
    let rows = payload
        .as_array()
        .ok_or_else(|| Error::new("binance klines payload is not an array"))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        let row = row
            .as_array()
            .ok_or_else(|| Error::new("binance kline row is not an array"))?;
        if row.len() < 6 {
            return Err(Error::new("binance kline row has insufficient fields"));
        }
        candles.push(Candle {
            timestamp_ms: value_to_i64(&row[0])?,
            open: value_to_f64(&row[1])?,
            high: value_to_f64(&row[2])?,
            low: value_to_f64(&row[3])?,
            close: value_to_f64(&row[4])?,
            volume: value_to_f64(&row[5])?,
        });
    }

    candles.sort_by_key(|candle| candle.timestamp_ms);
    Ok(candles)
}
