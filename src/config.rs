use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;

/// Logical asset key -> unified `BASE/QUOTE` trading pair.
pub type AssetSymbolMap = BTreeMap<String, String>;

#[derive(Clone, Debug)]
pub struct VenueConfig {
    pub id: String,
    pub base_url: Option<String>,
    pub sandbox: bool,
    pub timeout_secs: u64,
    pub limit: Option<u32>,
    pub min_request_interval_ms: u64,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TickerConfig {
    pub crypto: AssetSymbolMap,
    /// Equity/futures vendor tickers. Declared for the analysis layer; no
    /// vendor client consumes these yet.
    pub equity: AssetSymbolMap,
    pub targets: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct DataConfig {
    pub timeframe: String,
    pub period: String,
}

/// Forward-looking analysis parameters. Validated at load, consumed by no
/// modeling code in this snapshot.
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    pub correlation_window: u32,
    pub beta_benchmark_equity: String,
    pub beta_benchmark_crypto: String,
    pub garch_p: u32,
    pub garch_q: u32,
    pub garch_forecast_horizon: u32,
    pub garch_distribution: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct OutputConfig {
    pub format: String,
    pub path: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub venue: VenueConfig,
    pub tickers: TickerConfig,
    pub data: DataConfig,
    pub analysis: AnalysisConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

#[derive(Clone, Debug, Deserialize)]
struct VenueConfigFile {
    id: Option<String>,
    base_url: Option<String>,
    sandbox: Option<bool>,
    timeout_secs: Option<u64>,
    limit: Option<u32>,
    min_request_interval_ms: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
struct TickerConfigFile {
    crypto: Option<BTreeMap<String, String>>,
    equity: Option<BTreeMap<String, String>>,
    targets: Option<Vec<String>>,
}

#[derive(Clone, Debug, Deserialize)]
struct DataConfigFile {
    timeframe: Option<String>,
    period: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct AnalysisConfigFile {
    correlation_window: Option<u32>,
    beta_benchmark_equity: Option<String>,
    beta_benchmark_crypto: Option<String>,
    garch_p: Option<u32>,
    garch_q: Option<u32>,
    garch_forecast_horizon: Option<u32>,
    garch_distribution: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct ServerConfigFile {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Clone, Debug, Deserialize)]
struct OutputConfigFile {
    format: Option<String>,
    path: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct ConfigFile {
    venue: Option<VenueConfigFile>,
    tickers: Option<TickerConfigFile>,
    data: Option<DataConfigFile>,
    analysis: Option<AnalysisConfigFile>,
    server: Option<ServerConfigFile>,
    output: Option<OutputConfigFile>,
}

pub const SUPPORTED_VENUES: [&str; 3] = ["binance", "bybit", "okx"];

impl Default for Config {
    fn default() -> Self {
        let crypto = BTreeMap::from([
            ("BITCOIN".to_string(), "BTC/USDT".to_string()),
            ("ETHEREUM".to_string(), "ETH/USDT".to_string()),
            ("SOLANA".to_string(), "SOL/USDT".to_string()),
        ]);
        let equity = BTreeMap::from([
            ("SP500".to_string(), "^GSPC".to_string()),
            ("NASDAQ100".to_string(), "^NDX".to_string()),
            ("DOWJONES".to_string(), "^DJI".to_string()),
            ("VIX".to_string(), "^VIX".to_string()),
            ("GOLD".to_string(), "GC=F".to_string()),
            ("SILVER".to_string(), "SI=F".to_string()),
            ("CRUDE_OIL".to_string(), "CL=F".to_string()),
        ]);

        Self {
            venue: VenueConfig {
                id: "binance".to_string(),
                base_url: None,
                sandbox: false,
                timeout_secs: 30,
                limit: None,
                min_request_interval_ms: 250,
                api_key: None,
                api_secret: None,
            },
            tickers: TickerConfig {
                crypto,
                equity,
                targets: vec!["SOLANA".to_string()],
            },
            data: DataConfig {
                timeframe: "1d".to_string(),
                period: "2y".to_string(),
            },
            analysis: AnalysisConfig {
                correlation_window: 90,
                beta_benchmark_equity: "SP500".to_string(),
                beta_benchmark_crypto: "BITCOIN".to_string(),
                garch_p: 1,
                garch_q: 1,
                garch_forecast_horizon: 5,
                garch_distribution: "Normal".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            output: OutputConfig {
                format: "none".to_string(),
                path: "output/candles.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|err| Error::new(format!("failed to read config: {err}")))?;
        let file: ConfigFile = toml::from_str(&content)
            .map_err(|err| Error::new(format!("failed to parse config: {err}")))?;
        let mut config = Config::from_file(file);
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Self {
        let mut config = Config::default();

        if let Some(venue) = file.venue {
            if let Some(value) = venue.id {
                config.venue.id = value;
            }
            if let Some(value) = venue.base_url {
                config.venue.base_url = Some(value);
            }
            if let Some(value) = venue.sandbox {
                config.venue.sandbox = value;
            }
            if let Some(value) = venue.timeout_secs {
                config.venue.timeout_secs = value;
            }
            if let Some(value) = venue.limit {
                config.venue.limit = Some(value);
            }
            if let Some(value) = venue.min_request_interval_ms {
                config.venue.min_request_interval_ms = value;
            }
        }

        if let Some(tickers) = file.tickers {
            if let Some(value) = tickers.crypto {
                config.tickers.crypto = value;
            }
            if let Some(value) = tickers.equity {
                config.tickers.equity = value;
            }
            if let Some(value) = tickers.targets {
                config.tickers.targets = value;
            }
        }

        if let Some(data) = file.data {
            if let Some(value) = data.timeframe {
                config.data.timeframe = value;
            }
            if let Some(value) = data.period {
                config.data.period = value;
            }
        }

        if let Some(analysis) = file.analysis {
            if let Some(value) = analysis.correlation_window {
                config.analysis.correlation_window = value;
            }
            if let Some(value) = analysis.beta_benchmark_equity {
                config.analysis.beta_benchmark_equity = value;
            }
            if let Some(value) = analysis.beta_benchmark_crypto {
                config.analysis.beta_benchmark_crypto = value;
            }
            if let Some(value) = analysis.garch_p {
                config.analysis.garch_p = value;
            }
            if let Some(value) = analysis.garch_q {
                config.analysis.garch_q = value;
            }
            if let Some(value) = analysis.garch_forecast_horizon {
                config.analysis.garch_forecast_horizon = value;
            }
            if let Some(value) = analysis.garch_distribution {
                config.analysis.garch_distribution = value;
            }
        }

        if let Some(server) = file.server {
            if let Some(value) = server.host {
                config.server.host = value;
            }
            if let Some(value) = server.port {
                config.server.port = value;
            }
        }

        if let Some(output) = file.output {
            if let Some(value) = output.format {
                config.output.format = value;
            }
            if let Some(value) = output.path {
                config.output.path = value;
            }
        }

        config
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = read_string_env("QUANTFEED_VENUE")? {
            self.venue.id = value;
        }
        if let Some(value) = read_string_env("QUANTFEED_VENUE_BASE_URL")? {
            self.venue.base_url = Some(value);
        }
        if let Some(value) = read_bool_env("QUANTFEED_SANDBOX")? {
            self.venue.sandbox = value;
        }
        if let Some(value) = read_u64_env("QUANTFEED_VENUE_TIMEOUT_SECS")? {
            self.venue.timeout_secs = value;
        }
        if let Some(value) = read_u32_env("QUANTFEED_VENUE_LIMIT")? {
            self.venue.limit = Some(value);
        }
        if let Some(value) = read_u64_env("QUANTFEED_MIN_REQUEST_INTERVAL_MS")? {
            self.venue.min_request_interval_ms = value;
        }

        // Credentials are environment-only; they never live in the TOML file.
        if let Some(value) = read_string_env("QUANTFEED_API_KEY")? {
            self.venue.api_key = Some(value);
        }
        if let Some(value) = read_string_env("QUANTFEED_API_SECRET")? {
            self.venue.api_secret = Some(value);
        }

        if let Some(value) = read_string_env("QUANTFEED_TIMEFRAME")? {
            self.data.timeframe = value;
        }
        if let Some(value) = read_string_env("QUANTFEED_PERIOD")? {
            self.data.period = value;
        }

        if let Some(value) = read_string_env("QUANTFEED_SERVER_HOST")? {
            self.server.host = value;
        }
        if let Some(value) = read_u16_env("QUANTFEED_SERVER_PORT")? {
            self.server.port = value;
        }

        if let Some(value) = read_string_env("QUANTFEED_OUTPUT_FORMAT")? {
            self.output.format = value;
        }
        if let Some(value) = read_string_env("QUANTFEED_OUTPUT_PATH")? {
            self.output.path = value;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let venue = self.venue.id.to_lowercase();
        if !SUPPORTED_VENUES.contains(&venue.as_str()) {
            return Err(Error::new(format!(
                "venue.id must be one of {}",
                SUPPORTED_VENUES.join(", ")
            )));
        }
        if self.venue.timeout_secs == 0 {
            return Err(Error::new("venue.timeout_secs must be positive"));
        }
        if let Some(limit) = self.venue.limit {
            if limit == 0 {
                return Err(Error::new("venue.limit must be positive"));
            }
        }
        if let Some(url) = &self.venue.base_url {
            if url.trim().is_empty() {
                return Err(Error::new("venue.base_url must be non-empty"));
            }
        }

        if self.tickers.crypto.is_empty() {
            return Err(Error::new("tickers.crypto must contain at least one entry"));
        }
        for (key, pair) in &self.tickers.crypto {
            if key.trim().is_empty() {
                return Err(Error::new("tickers.crypto keys must be non-empty"));
            }
            validate_pair(key, pair)?;
        }
        for (key, ticker) in &self.tickers.equity {
            if key.trim().is_empty() || ticker.trim().is_empty() {
                return Err(Error::new("tickers.equity entries must be non-empty"));
            }
        }
        if self.tickers.targets.is_empty() {
            return Err(Error::new("tickers.targets must name at least one asset"));
        }
        for target in &self.tickers.targets {
            if !self.tickers.crypto.contains_key(target) {
                return Err(Error::new(format!(
                    "tickers.targets entry {target} is not a tickers.crypto key"
                )));
            }
        }

        if self.data.timeframe.trim().is_empty() {
            return Err(Error::new("data.timeframe must be set"));
        }
        if self.data.period.trim().is_empty() {
            return Err(Error::new("data.period must be set"));
        }

        if self.analysis.correlation_window < 2 {
            return Err(Error::new("analysis.correlation_window must be at least 2"));
        }
        if !self
            .tickers
            .crypto
            .contains_key(&self.analysis.beta_benchmark_crypto)
        {
            return Err(Error::new(
                "analysis.beta_benchmark_crypto is not a tickers.crypto key",
            ));
        }
        if !self
            .tickers
            .equity
            .contains_key(&self.analysis.beta_benchmark_equity)
        {
            return Err(Error::new(
                "analysis.beta_benchmark_equity is not a tickers.equity key",
            ));
        }
        if self.analysis.garch_p == 0 {
            return Err(Error::new("analysis.garch_p must be at least 1"));
        }
        if self.analysis.garch_forecast_horizon == 0 {
            return Err(Error::new(
                "analysis.garch_forecast_horizon must be at least 1",
            ));
        }
        match self.analysis.garch_distribution.as_str() {
            "Normal" | "t" | "skewt" => {}
            _ => {
                return Err(Error::new(
                    "analysis.garch_distribution must be Normal, t, or skewt",
                ))
            }
        }

        if self.server.host.trim().is_empty() {
            return Err(Error::new("server.host must be set"));
        }
        if self.server.port == 0 {
            return Err(Error::new("server.port must be positive"));
        }

        match self.output.format.as_str() {
            "none" | "json" | "csv" => {}
            _ => return Err(Error::new("output.format must be none, json, or csv")),
        }
        if self.output.format != "none" && self.output.path.trim().is_empty() {
            return Err(Error::new("output.path must be set"));
        }

        Ok(())
    }
}

fn validate_pair(key: &str, pair: &str) -> Result<()> {
    let mut parts = pair.splitn(2, '/');
    let base = parts.next().unwrap_or("");
    let quote = parts.next().unwrap_or("");
    if base.trim().is_empty() || quote.trim().is_empty() {
        return Err(Error::new(format!(
            "tickers.crypto entry {key} must be a BASE/QUOTE pair, got {pair}"
        )));
    }
    Ok(())
}

fn read_string_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_bool_env(key: &str) -> Result<Option<bool>> {
    match env::var(key) {
        Ok(value) => match value.to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            _ => Err(Error::new(format!("{key} must be a boolean"))),
        },
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_u16_env(key: &str) -> Result<Option<u16>> {
    match env::var(key) {
        Ok(value) => value
            .parse::<u16>()
            .map(Some)
            .map_err(|err| Error::new(format!("{key} must be u16: {err}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_u32_env(key: &str) -> Result<Option<u32>> {
    match env::var(key) {
        Ok(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|err| Error::new(format!("{key} must be u32: {err}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}

fn read_u64_env(key: &str) -> Result<Option<u64>> {
    match env::var(key) {
        Ok(value) => value
            .parse::<u64>()
            .map(Some)
            .map_err(|err| Error::new(format!("{key} must be u64: {err}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new(format!("failed to read {key}: {err}"))),
    }
}
