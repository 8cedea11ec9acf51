use crate::app::metrics;
use crate::app::report::{write_output, SeriesMeta};
use crate::config::Config;
use crate::data::fetcher::{FetchError, MarketDataFetcher};
use crate::venue;
use crate::{Error, Result};
use std::env;
use std::path::Path;
use tracing::info;

pub fn run() -> Result<()> {
    metrics::init_start_time();
    let args: Vec<String> = env::args().collect();
    let cli = parse_args(&args)?;

    if cli.show_help {
        print_usage();
        return Ok(());
    }

    let mut config = Config::load(&cli.config_path)?;
    if let Some(timeframe) = cli.timeframe_override {
        config.data.timeframe = timeframe;
    }
    if let Some(format) = cli.output_format {
        config.output.format = format;
    }
    if let Some(path) = cli.output_path {
        config.output.path = path;
    }
    config.validate()?;

    let client = venue::client_from_config(&config.venue)?;
    let fetcher = MarketDataFetcher::new(config.tickers.crypto.clone(), client);

    let assets = match cli.asset_override {
        Some(asset) => vec![asset],
        None => config.tickers.targets.clone(),
    };

    let mut failures = 0usize;
    let mut last_error: Option<FetchError> = None;
    for asset in &assets {
        match fetcher.fetch_candles(asset, &config.data.timeframe) {
            Ok(series) => {
                metrics::record_success(series.len());
                let symbol = fetcher.symbol_for(asset).unwrap_or_default().to_string();
                println!("asset: {asset}");
                println!("symbol: {symbol}");
                println!("timeframe: {}", config.data.timeframe);
                println!("candles: {}", series.len());
                if let (Some(first), Some(last)) = (series.first(), series.last()) {
                    println!("first_timestamp_ms: {}", first.timestamp_ms);
                    println!("last_timestamp_ms: {}", last.timestamp_ms);
                    println!("last_close: {}", last.close);
                }

                if config.output.format != "none" {
                    let path = output_path_for(&config.output.path, asset);
                    let meta = SeriesMeta {
                        asset,
                        symbol: &symbol,
                        timeframe: &config.data.timeframe,
                        venue: &config.venue.id,
                    };
                    write_output(&path, &config.output.format, &meta, &series)?;
                    println!("output_written: {path} ({})", config.output.format);
                }
                info!(asset = %asset, candles = series.len(), "fetch complete");
            }
            Err(err) => {
                match &err {
                    FetchError::UnknownAsset { .. } => metrics::record_unknown_asset(),
                    FetchError::Venue { .. } => metrics::record_venue_error(),
                }
                println!("fetch_failed: {asset} ({err})");
                last_error = Some(err);
                failures += 1;
            }
        }
    }

    metrics::write_if_configured()?;

    if failures > 0 && failures == assets.len() {
        return Err(last_error
            .map(Into::into)
            .unwrap_or_else(|| Error::new("all fetches failed")));
    }
    Ok(())
}

struct CliArgs {
    config_path: String,
    asset_override: Option<String>,
    timeframe_override: Option<String>,
    output_format: Option<String>,
    output_path: Option<String>,
    show_help: bool,
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut config_path = "config.toml".to_string();
    let mut asset_override = None;
    let mut timeframe_override = None;
    let mut output_format = None;
    let mut output_path = None;
    let mut show_help = false;

    let mut index = 1;
    while index < args.len() {
        match args[index].as_str() {
            "--help" | "-h" => {
                show_help = true;
                index += 1;
            }
            "--config" | "-c" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| Error::new("missing value for --config"))?;
                config_path = value.to_string();
                index += 2;
            }
            "--asset" | "-a" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| Error::new("missing value for --asset"))?;
                asset_override = Some(value.to_string());
                index += 2;
            }
            "--timeframe" | "-t" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| Error::new("missing value for --timeframe"))?;
                timeframe_override = Some(value.to_string());
                index += 2;
            }
            "--output-format" | "-f" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| Error::new("missing value for --output-format"))?;
                output_format = Some(value.to_string());
                index += 2;
            }
            "--output-path" | "-o" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| Error::new("missing value for --output-path"))?;
                output_path = Some(value.to_string());
                index += 2;
            }
            unknown => {
                return Err(Error::new(format!("unknown argument: {unknown}")));
            }
        }
    }

    Ok(CliArgs {
        config_path,
        asset_override,
        timeframe_override,
        output_format,
        output_path,
        show_help,
    })
}

fn print_usage() {
    println!("usage: quantfeed [--config <path>] [--asset <KEY>] [--timeframe <tf>] [--output-format <fmt>] [--output-path <path>]");
    println!("  -c, --config   Path to config.toml (default: config.toml)");
    println!("  -a, --asset    Fetch a single asset key instead of the configured targets");
    println!("  -t, --timeframe       Override data.timeframe from config");
    println!("  -f, --output-format   Override output format (none|json|csv)");
    println!("  -o, --output-path     Override output path");
    println!("  -h, --help     Show this help");
}

/// Per-asset output file: `output/candles.json` + `SOLANA` ->
/// `output/SOLANA_candles.json`.
fn output_path_for(path: &str, asset: &str) -> String {
    let path = Path::new(path);
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "candles.json".to_string());
    let prefixed = format!("{asset}_{file_name}");
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent
            .join(prefixed)
            .to_string_lossy()
            .to_string(),
        _ => prefixed,
    }
}
