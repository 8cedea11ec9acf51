use quantfeed::venue::{binance, bybit, okx, split_pair};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let content = fs::read_to_string(&path).expect("read fixture");
    serde_json::from_str(&content).expect("fixture is valid json")
}

#[test]
fn parses_binance_klines() {
    let payload = fixture("binance_klines.json");
    let candles = binance::parse_klines(&payload).expect("parse");

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].timestamp_ms, 1704067200000);
    assert_eq!(candles[0].open, 93.0);
    assert_eq!(candles[0].close, 95.1);
    assert_eq!(candles[1].timestamp_ms, 1704153600000);
    assert_eq!(candles[1].close, 96.55);
    assert_eq!(candles[1].volume, 120345.2);
}

#[test]
fn parses_bybit_klines_into_ascending_order() {
    let payload = fixture("bybit_klines.json");
    let candles = bybit::parse_klines(&payload).expect("parse");

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].timestamp_ms, 1704067200000);
    assert_eq!(candles[0].close, 95.1);
    assert_eq!(candles[1].timestamp_ms, 1704153600000);
    assert_eq!(candles[1].close, 96.55);
}

#[test]
fn parses_okx_candles_into_ascending_order() {
    let payload = fixture("okx_candles.json");
    let candles = okx::parse_candles(&payload).expect("parse");

    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].timestamp_ms, 1704067200000);
    assert_eq!(candles[0].low, 92.1);
    assert_eq!(candles[1].timestamp_ms, 1704153600000);
    assert_eq!(candles[1].high, 97.4);
}

#[test]
fn bybit_error_code_is_rejected() {
    let payload: Value =
        serde_json::from_str(r#"{"retCode":10001,"retMsg":"params error","result":{}}"#)
            .expect("json");
    let err = bybit::parse_klines(&payload).expect_err("error payload");
    assert!(err.message.contains("10001"));
    assert!(err.message.contains("params error"));
}

#[test]
fn okx_error_code_is_rejected() {
    let payload: Value =
        serde_json::from_str(r#"{"code":"51001","msg":"Instrument ID does not exist","data":[]}"#)
            .expect("json");
    let err = okx::parse_candles(&payload).expect_err("error payload");
    assert!(err.message.contains("51001"));
}

#[test]
fn binance_rejects_short_rows() {
    let payload: Value = serde_json::from_str(r#"[[1704067200000, "93.0"]]"#).expect("json");
    assert!(binance::parse_klines(&payload).is_err());
}

#[test]
fn maps_bybit_intervals() {
    assert_eq!(bybit::map_interval("1m").expect("1m"), "1");
    assert_eq!(bybit::map_interval("1h").expect("1h"), "60");
    assert_eq!(bybit::map_interval("1d").expect("1d"), "D");
    assert_eq!(bybit::map_interval("1M").expect("1M"), "M");
    assert!(bybit::map_interval("7m").is_err());
}

#[test]
fn maps_okx_intervals() {
    assert_eq!(okx::map_interval("1m").expect("1m"), "1m");
    assert_eq!(okx::map_interval("1h").expect("1h"), "1H");
    assert_eq!(okx::map_interval("1d").expect("1d"), "1D");
    assert_eq!(okx::map_interval("1M").expect("1M"), "1M");
    assert!(okx::map_interval("7m").is_err());
}

#[test]
fn spells_venue_symbols() {
    assert_eq!(binance::venue_symbol("SOL/USDT").expect("pair"), "SOLUSDT");
    assert_eq!(bybit::venue_symbol("BTC/USDT").expect("pair"), "BTCUSDT");
    assert_eq!(okx::venue_symbol("SOL/USDT").expect("pair"), "SOL-USDT");
    assert!(binance::venue_symbol("SOLUSDT").is_err());
    assert!(okx::venue_symbol("/USDT").is_err());
}

#[test]
fn splits_pairs() {
    assert_eq!(
        split_pair("ETH/USDT").expect("pair"),
        ("ETH".to_string(), "USDT".to_string())
    );
    assert!(split_pair("ETH").is_err());
    assert!(split_pair("ETH/").is_err());
}
