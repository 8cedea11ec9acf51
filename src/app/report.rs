use crate::models::CandleSeries;
use crate::{Error, Result};
use chrono::DateTime;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug)]
pub struct SeriesMeta<'a> {
    pub asset: &'a str,
    pub symbol: &'a str,
    pub timeframe: &'a str,
    pub venue: &'a str,
}

#[derive(Serialize)]
struct CandleRecord {
    timestamp_ms: i64,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Serialize)]
struct CsvRow {
    asset: String,
    symbol: String,
    timeframe: String,
    timestamp_ms: i64,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Serialize)]
struct SeriesReport {
    asset: String,
    symbol: String,
    timeframe: String,
    venue: String,
    candle_count: usize,
    candles: Vec<CandleRecord>,
}

/// Write one series as chart data. The dashboard consuming the export draws
/// the price lines and the volume overlay.
pub fn write_output(
    path: &str,
    format: &str,
    meta: &SeriesMeta<'_>,
    series: &CandleSeries,
) -> Result<()> {
    match format {
        "json" => write_json(path, meta, series),
        "csv" => write_csv(path, meta, series),
        "none" => Ok(()),
        _ => Err(Error::new("output.format must be none, json, or csv")),
    }
}

fn write_json(path: &str, meta: &SeriesMeta<'_>, series: &CandleSeries) -> Result<()> {
    ensure_parent_dir(path)?;
    let report = build_report(meta, series);
    let payload = serde_json::to_string_pretty(&report)
        .map_err(|err| Error::new(format!("json serialization failed: {err}")))?;
    fs::write(path, payload).map_err(|err| Error::new(format!("write failed: {err}")))?;
    Ok(())
}

fn write_csv(path: &str, meta: &SeriesMeta<'_>, series: &CandleSeries) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|err| Error::new(format!("csv open failed: {err}")))?;
    for candle in series.iter() {
        let row = CsvRow {
            asset: meta.asset.to_string(),
            symbol: meta.symbol.to_string(),
            timeframe: meta.timeframe.to_string(),
            timestamp_ms: candle.timestamp_ms,
            time: rfc3339(candle.timestamp_ms),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        };
        writer
            .serialize(&row)
            .map_err(|err| Error::new(format!("csv write failed: {err}")))?;
    }
    writer
        .flush()
        .map_err(|err| Error::new(format!("csv flush failed: {err}")))?;
    Ok(())
}

fn build_report(meta: &SeriesMeta<'_>, series: &CandleSeries) -> SeriesReport {
    let candles = series
        .iter()
        .map(|candle| CandleRecord {
            timestamp_ms: candle.timestamp_ms,
            time: rfc3339(candle.timestamp_ms),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
        })
        .collect::<Vec<_>>();
    SeriesReport {
        asset: meta.asset.to_string(),
        symbol: meta.symbol.to_string(),
        timeframe: meta.timeframe.to_string(),
        venue: meta.venue.to_string(),
        candle_count: candles.len(),
        candles,
    }
}

pub fn rfc3339(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|datetime| datetime.to_rfc3339())
        .unwrap_or_default()
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::new(format!("output dir create failed: {err}")))?;
        }
    }
    Ok(())
}
