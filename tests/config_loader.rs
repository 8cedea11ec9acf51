use quantfeed::config::Config;
use std::env;
use std::fs;
use std::path::PathBuf;

fn temp_config_path(name: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("quantfeed_{name}.toml"));
    path
}

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    config.validate().expect("defaults validate");

    assert_eq!(config.venue.id, "binance");
    assert_eq!(
        config.tickers.crypto.get("SOLANA").map(String::as_str),
        Some("SOL/USDT")
    );
    assert_eq!(config.tickers.targets, vec!["SOLANA".to_string()]);
    assert_eq!(config.data.timeframe, "1d");
    assert_eq!(config.analysis.correlation_window, 90);
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.output.format, "none");
}

#[test]
fn loads_config_and_applies_env_overrides() {
    let path = temp_config_path("config_loader");
    let content = r#"
[venue]
id = "okx"
timeout_secs = 10

[tickers]
targets = ["SOLANA", "BITCOIN"]

[tickers.crypto]
BITCOIN = "BTC/USDT"
SOLANA = "SOL/USDT"

[data]
timeframe = "4h"
period = "6mo"

[server]
host = "127.0.0.1"
port = 8080

[output]
format = "json"
path = "out/candles.json"
"#;

    fs::write(&path, content).expect("write temp config");
    env::set_var("QUANTFEED_TIMEFRAME", "1h");
    env::set_var("QUANTFEED_VENUE_LIMIT", "200");
    env::set_var("QUANTFEED_API_KEY", "test-key");

    let config = Config::load(path.to_str().expect("path")).expect("load config");

    assert_eq!(config.venue.id, "okx");
    assert_eq!(config.venue.timeout_secs, 10);
    assert_eq!(config.venue.limit, Some(200));
    assert_eq!(config.venue.api_key.as_deref(), Some("test-key"));
    assert_eq!(config.data.timeframe, "1h");
    assert_eq!(config.data.period, "6mo");
    assert_eq!(config.tickers.targets.len(), 2);
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.output.format, "json");

    env::remove_var("QUANTFEED_TIMEFRAME");
    env::remove_var("QUANTFEED_VENUE_LIMIT");
    env::remove_var("QUANTFEED_API_KEY");
    let _ = fs::remove_file(&path);
}

#[test]
fn rejects_unsupported_venue() {
    let mut config = Config::default();
    config.venue.id = "bitfinex".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn rejects_target_missing_from_crypto_map() {
    let mut config = Config::default();
    config.tickers.targets = vec!["DOGE".to_string()];
    assert!(config.validate().is_err());
}

#[test]
fn rejects_malformed_trading_pair() {
    let mut config = Config::default();
    config
        .tickers
        .crypto
        .insert("BONK".to_string(), "BONKUSDT".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn rejects_unknown_beta_benchmark() {
    let mut config = Config::default();
    config.analysis.beta_benchmark_crypto = "RIPPLE".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.analysis.beta_benchmark_equity = "FTSE".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn rejects_bad_analysis_parameters() {
    let mut config = Config::default();
    config.analysis.correlation_window = 1;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.analysis.garch_p = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.analysis.garch_distribution = "cauchy".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn rejects_bad_output_settings() {
    let mut config = Config::default();
    config.output.format = "xml".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.output.format = "json".to_string();
    config.output.path = " ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn rejects_empty_crypto_map() {
    let mut config = Config::default();
    config.tickers.crypto.clear();
    assert!(config.validate().is_err());
}
