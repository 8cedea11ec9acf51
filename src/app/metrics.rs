use crate::{Error, Result};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

static START_TIME: OnceLock<i64> = OnceLock::new();

static FETCH_TOTAL: AtomicU64 = AtomicU64::new(0);
static FETCH_SUCCESS_TOTAL: AtomicU64 = AtomicU64::new(0);
static UNKNOWN_ASSET_TOTAL: AtomicU64 = AtomicU64::new(0);
static VENUE_ERROR_TOTAL: AtomicU64 = AtomicU64::new(0);
static CANDLES_FETCHED_TOTAL: AtomicU64 = AtomicU64::new(0);

static LAST_FETCH_TIMESTAMP: AtomicU64 = AtomicU64::new(0);

pub fn init_start_time() {
    let _ = START_TIME.set(now_epoch());
}

pub fn record_success(candle_count: usize) {
    FETCH_TOTAL.fetch_add(1, Ordering::Relaxed);
    FETCH_SUCCESS_TOTAL.fetch_add(1, Ordering::Relaxed);
    CANDLES_FETCHED_TOTAL.fetch_add(candle_count as u64, Ordering::Relaxed);
    LAST_FETCH_TIMESTAMP.store(now_epoch() as u64, Ordering::Relaxed);
}

pub fn record_unknown_asset() {
    FETCH_TOTAL.fetch_add(1, Ordering::Relaxed);
    UNKNOWN_ASSET_TOTAL.fetch_add(1, Ordering::Relaxed);
    LAST_FETCH_TIMESTAMP.store(now_epoch() as u64, Ordering::Relaxed);
}

pub fn record_venue_error() {
    FETCH_TOTAL.fetch_add(1, Ordering::Relaxed);
    VENUE_ERROR_TOTAL.fetch_add(1, Ordering::Relaxed);
    LAST_FETCH_TIMESTAMP.store(now_epoch() as u64, Ordering::Relaxed);
}

pub fn write_if_configured() -> Result<()> {
    let path = match std::env::var("QUANTFEED_METRICS_PATH") {
        Ok(value) if !value.trim().is_empty() => value,
        _ => return Ok(()),
    };
    write_metrics(&path)
}

pub fn write_metrics(path: &str) -> Result<()> {
    let content = render();
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| Error::new(format!("metrics dir create failed: {err}")))?;
    }
    fs::write(path, content).map_err(|err| Error::new(format!("metrics write failed: {err}")))
}

pub fn render() -> String {
    let mut output = String::new();
    push_line(&mut output, "# HELP quantfeed_up Quantfeed process up");
    push_line(&mut output, "# TYPE quantfeed_up gauge");
    push_line(&mut output, "quantfeed_up 1");
    push_line(
        &mut output,
        "# HELP quantfeed_uptime_seconds Process uptime in seconds",
    );
    push_line(&mut output, "# TYPE quantfeed_uptime_seconds gauge");
    push_line(
        &mut output,
        &format!("quantfeed_uptime_seconds {}", uptime_seconds()),
    );
    push_line(&mut output, "# HELP quantfeed_fetch_total Total fetch calls");
    push_line(&mut output, "# TYPE quantfeed_fetch_total counter");
    push_line(
        &mut output,
        &format!("quantfeed_fetch_total {}", FETCH_TOTAL.load(Ordering::Relaxed)),
    );
    push_line(
        &mut output,
        "# HELP quantfeed_fetch_success_total Successful fetch calls",
    );
    push_line(&mut output, "# TYPE quantfeed_fetch_success_total counter");
    push_line(
        &mut output,
        &format!(
            "quantfeed_fetch_success_total {}",
            FETCH_SUCCESS_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(
        &mut output,
        "# HELP quantfeed_unknown_asset_total Fetch calls for unmapped asset keys",
    );
    push_line(&mut output, "# TYPE quantfeed_unknown_asset_total counter");
    push_line(
        &mut output,
        &format!(
            "quantfeed_unknown_asset_total {}",
            UNKNOWN_ASSET_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(
        &mut output,
        "# HELP quantfeed_venue_error_total Fetch calls failed at the venue",
    );
    push_line(&mut output, "# TYPE quantfeed_venue_error_total counter");
    push_line(
        &mut output,
        &format!(
            "quantfeed_venue_error_total {}",
            VENUE_ERROR_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(
        &mut output,
        "# HELP quantfeed_candles_fetched_total Total candles returned",
    );
    push_line(&mut output, "# TYPE quantfeed_candles_fetched_total counter");
    push_line(
        &mut output,
        &format!(
            "quantfeed_candles_fetched_total {}",
            CANDLES_FETCHED_TOTAL.load(Ordering::Relaxed)
        ),
    );
    push_line(
        &mut output,
        "# HELP quantfeed_last_fetch_timestamp Last fetch call (epoch seconds)",
    );
    push_line(&mut output, "# TYPE quantfeed_last_fetch_timestamp gauge");
    push_line(
        &mut output,
        &format!(
            "quantfeed_last_fetch_timestamp {}",
            LAST_FETCH_TIMESTAMP.load(Ordering::Relaxed)
        ),
    );
    output
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}

fn uptime_seconds() -> i64 {
    let start = START_TIME.get().copied().unwrap_or_else(now_epoch);
    now_epoch().saturating_sub(start)
}

fn push_line(target: &mut String, line: &str) {
    target.push_str(line);
    target.push('\n');
}
