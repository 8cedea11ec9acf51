use crate::data::market_data::MarketDataClient;
use crate::models::Candle;
use crate::venue::{split_pair, value_to_f64, value_to_i64, Throttle};
use crate::{Error, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://www.okx.com";

const MAX_LIMIT: u32 = 300;

#[derive(Clone, Debug)]
pub struct OkxConfig {
    pub base_url: String,
    /// Demo-trading flag; OKX keeps the production host and switches on a
    /// header instead of a separate base URL.
    pub simulated: bool,
    pub limit: Option<u32>,
    pub timeout_secs: u64,
    pub min_request_interval_ms: u64,
}

pub struct OkxClient {
    client: Client,
    config: OkxConfig,
    throttle: Throttle,
}

impl OkxClient {
    pub fn new(config: OkxConfig) -> Result<Self> {
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
        if self.config.simulated {
            request = request.header("x-simulated-trading", "1");
        }
        let response = request
            .send()
            .map_err(|err| Error::new(format!("http request failed: {err}")))?;
        if !response.status().is_success() {
            return Err(Error::new(format!(
                "okx response status: {}",
                response.status()
            )));
        }
        response
            .json::<Value>()
            .map_err(|err| Error::new(format!("json parse failed: {err}")))
    }
}

impl MarketDataClient for OkxClient {
    fn fetch_ohlcv(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>> {
        let inst_id = venue_symbol(symbol)?;
        let bar = map_interval(timeframe)?;
        let mut query = vec![
            ("instId".to_string(), inst_id),
            ("bar".to_string(), bar),
        ];
        if let Some(limit) = self.config.limit {
            query.push(("limit".to_string(), limit.min(MAX_LIMIT).to_string()));
        }
        let payload = self.get_json("/api/v5/market/candles", &query)?;
        parse_candles(&payload)
    }
}

/// `SOL/USDT` -> `SOL-USDT`.
pub fn venue_symbol(pair: &str) -> Result<String> {
    let (base, quote) = split_pair(pair)?;
    Ok(format!("{base}-{quote}"))
}

/// OKX upper-cases hour-and-above bars.
pub fn map_interval(timeframe: &str) -> Result<String> {
    let trimmed = timeframe.trim();
    if trimmed.is_empty() {
        return Err(Error::new("okx interval must be non-empty"));
    }
    if trimmed == "1M" {
        return Ok("1M".to_string());
    }
    match trimmed.to_lowercase().as_str() {
        "1m" => Ok("1m".to_string()),
        "3m" => Ok("3m".to_string()),
        "5m" => Ok("5m".to_string()),
        "15m" => Ok("15m".to_string()),
        "30m" => Ok("30m".to_string()),
        "1h" => Ok("1H".to_string()),
        "2h" => Ok("2H".to_string()),
        "4h" => Ok("4H".to_string()),
        "6h" => Ok("6H".to_string()),
        "12h" => Ok("12H".to_string()),
        "1d" => Ok("1D".to_string()),
        "1w" => Ok("1W".to_string()),
        _ => Err(Error::new(format!("unsupported okx interval: {trimmed}"))),
    }
}

pub fn parse_candles(payload: &Value) -> Result<Vec<Candle>> {
    let code = payload
        .get("code")
        .and_then(|value| value.as_str())
        .unwrap_or("1");
    if code != "0" {
        let message = payload
            .get("msg")
            .and_then(|value| value.as_str())
            .unwrap_or("unknown");
        return Err(Error::new(format!("okx code {code}: {message}")));
    }

    let list = payload
        .get("data")
        .and_then(|value| value.as_array())
        .ok_or_else(|| Error::new("okx data missing"))?;

    let mut candles = Vec::with_capacity(list.len());
    for row in list {
        let row = row
            .as_array()
            .ok_or_else(|| Error::new("okx candle row is not an array"))?;
        if row.len() < 6 {
            return Err(Error::new("okx candle row has insufficient fields"));
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

    // OKX returns newest first.
    candles.sort_by_key(|candle| candle.timestamp_ms);
    Ok(candles)
}
