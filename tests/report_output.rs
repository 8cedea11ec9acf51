use quantfeed::app::report::{write_output, SeriesMeta};
use quantfeed::models::{Candle, CandleSeries};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;

fn temp_output_path(name: &str) -> PathBuf {
    let mut path = env::temp_dir();
    path.push(format!("quantfeed_report_{name}"));
    path
}

fn sample_series() -> CandleSeries {
    CandleSeries::from_vec(vec![
        Candle {
            timestamp_ms: 1_700_000_000_000,
            open: 20.0,
            high: 21.0,
            low: 19.5,
            close: 20.5,
            volume: 1000.0,
        },
        Candle {
            timestamp_ms: 1_700_086_400_000,
            open: 20.5,
            high: 22.3,
            low: 20.1,
            close: 22.0,
            volume: 1430.0,
        },
    ])
}

fn meta<'a>() -> SeriesMeta<'a> {
    SeriesMeta {
        asset: "SOLANA",
        symbol: "SOL/USDT",
        timeframe: "1d",
        venue: "binance",
    }
}

#[test]
fn writes_json_chart_data() {
    let path = temp_output_path("series.json");
    let series = sample_series();

    write_output(path.to_str().expect("path"), "json", &meta(), &series).expect("write json");

    let content = fs::read_to_string(&path).expect("read output");
    let parsed: Value = serde_json::from_str(&content).expect("valid json");

    assert_eq!(parsed["asset"], "SOLANA");
    assert_eq!(parsed["symbol"], "SOL/USDT");
    assert_eq!(parsed["venue"], "binance");
    assert_eq!(parsed["candle_count"], 2);
    let candles = parsed["candles"].as_array().expect("candles array");
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0]["timestamp_ms"], 1_700_000_000_000_i64);
    assert_eq!(candles[0]["open"], 20.0);
    assert_eq!(candles[1]["close"], 22.0);
    assert_eq!(candles[1]["volume"], 1430.0);
    assert!(candles[0]["time"]
        .as_str()
        .expect("time string")
        .starts_with("2023-11-14"));

    let _ = fs::remove_file(&path);
}

#[test]
fn writes_csv_chart_data() {
    let path = temp_output_path("series.csv");
    let series = sample_series();

    write_output(path.to_str().expect("path"), "csv", &meta(), &series).expect("write csv");

    let content = fs::read_to_string(&path).expect("read output");
    let mut lines = content.lines();
    let header = lines.next().expect("header");
    assert!(header.contains("asset"));
    assert!(header.contains("open"));
    assert!(header.contains("volume"));
    assert_eq!(lines.clone().count(), 2);
    let first = lines.next().expect("first row");
    assert!(first.starts_with("SOLANA,SOL/USDT,1d,1700000000000"));

    let _ = fs::remove_file(&path);
}

#[test]
fn none_format_writes_nothing() {
    let path = temp_output_path("series_none.json");
    let series = sample_series();

    write_output(path.to_str().expect("path"), "none", &meta(), &series).expect("no-op");
    assert!(!path.exists());
}

#[test]
fn unknown_format_is_rejected() {
    let path = temp_output_path("series_bad.json");
    let series = sample_series();

    let err = write_output(path.to_str().expect("path"), "xml", &meta(), &series)
        .expect_err("unsupported format");
    assert!(err.message.contains("output.format"));
}
