use crate::data::market_data::MarketDataClient;
use crate::models::Candle;
use crate::venue::{split_pair, value_to_f64, value_to_i64, Throttle};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";
pub const SANDBOX_BASE_URL: &str = "https://api-testnet.bybit.com";

const MAX_LIMIT: u32 = 1000;

#[derive(Clone, Debug)]
pub struct BybitConfig {
    pub base_url: String,
    pub limit: Option<u32>,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

pub struct BybitClient {
    client: Client,
    config: BybitConfig,
    throttle: Throttle,
}

impl BybitClient {
    pub fn new(config: BybitConfig) -> Result<Self> {
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
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|err| Error::new(format!("http request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(Error::new(format!(
                "bybit response status: {}",
                response.status()
            )));
        }
        response
            .json::<Value>()
            .map_err(|err| Error::new(format!("json parse failed: {err}")))
    }
}

impl MarketDataClient for BybitClient {
    fn fetch_ohlcv(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>> {
        let venue_symbol = venue_symbol(symbol)?;
        let interval = map_interval(timeframe)?;
        let mut query = vec![
            ("category".to_string(), "spot".to_string()),
            ("symbol".to_string(), venue_symbol),
            ("interval".to_string(), interval),
        ];
        if let Some(limit) = self.config.limit {
            query.push(("limit".to_string(), limit.min(MAX_LIMIT).to_string()));
        }
        let payload = self.get_json("/v5/market/kline", &query)?;
        parse_klines(&payload)
    }
}

/// `SOL/USDT` -> `SOLUSDT`.
pub fn venue_symbol(pair: &str) -> Result<String> {
    let (base, quote) = split_pair(pair)?;
    Ok(format!("{base}{quote}"))
}

/// Bybit spells intervals as minutes or D/W/M.
pub fn map_interval(timeframe: &str) -> Result<String> {
    let trimmed = timeframe.trim();
    if trimmed.is_empty() {
        return Err(Error::new("bybit interval must be non-empty"));
    }
    if trimmed == "1M" {
        return Ok("M".to_string());
    }
    match trimmed.to_lowercase().as_str() {
        "1m" => Ok("1".to_string()),
        "3m" => Ok("3".to_string()),
        "5m" => Ok("5".to_string()),
        "15m" => Ok("15".to_string()),
        "30m" => Ok("30".to_string()),
        "1h" => Ok("60".to_string()),
        "2h" => Ok("120".to_string()),
        "4h" => Ok("240".to_string()),
        "6h" => Ok("360".to_string()),
        "12h" => Ok("720".to_string()),
        "1d" => Ok("D".to_string()),
        "1w" => Ok("W".to_string()),
        _ => Err(Error::new(format!("unsupported bybit interval: {trimmed}"))),
    }
}

pub fn parse_klines(payload: &Value) -> Result<Vec<Candle>> {
    let ret_code = payload
        .get("retCode")
        .and_then(|value| value.as_i64())
        .unwrap_or(-1);
    if ret_code != 0 {
        let message = payload
            .get("retMsg")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown");
        return Err(Error::new(format!("bybit retCode {ret_code}: {message}")));
    }

    let list = payload
        .get("result")
        .and_then(|value| value.get("list"))
        .and_then(|value| value.as_array())
        .ok_or_else(|| Error::new("bybit result.list missing"))?;

    let mut candles = Vec::with_capacity(list.len());
    for row in list {
        let row = row
            .as_array()
            .ok_or_else(|| Error::new("bybit kline row is not an array"))?;
        if row.len() < 6 {
            return Err(Error::new("bybit kline row has insufficient fields"));
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

    // Bybit returns newest first.
    candles.sort_by_key(|candle| candle.timestamp_ms);
    Ok(candles)
}
