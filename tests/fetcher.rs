use quantfeed::data::fetcher::{FetchError, MarketDataFetcher};
use quantfeed::data::market_data::MarketDataClient;
use quantfeed::models::Candle;
use quantfeed::{Error, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

struct MockClient {
    calls: AtomicUsize,
    response: Result<Vec<Candle>>,
}

impl MockClient {
    fn returning(rows: Vec<Candle>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Ok(rows),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Err(Error::new(message)),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarketDataClient for MockClient {
    fn fetch_ohlcv(&self, _symbol: &str, _timeframe: &str) -> Result<Vec<Candle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

fn symbol_map() -> BTreeMap<String, String> {
    BTreeMap::from([("SOLANA".to_string(), "SOL/USDT".to_string())])
}

fn candle(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle {
        timestamp_ms,
        open,
        high,
        low,
        close,
        volume,
    }
}

#[test]
fn unknown_asset_fails_without_network_call() {
    let client = MockClient::returning(vec![candle(1, 1.0, 2.0, 0.5, 1.5, 10.0)]);
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    let err = fetcher
        .fetch_candles("DOGE", "1d")
        .expect_err("DOGE is unmapped");

    assert_eq!(
        err,
        FetchError::UnknownAsset {
            asset_key: "DOGE".to_string()
        }
    );
    assert_eq!(client.call_count(), 0);
}

#[test]
fn venue_error_is_captured_at_the_boundary() {
    let client = MockClient::failing("http request failed: connection reset");
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    let err = fetcher
        .fetch_candles("SOLANA", "1d")
        .expect_err("client fails");

    match err {
        FetchError::Venue { asset_key, cause } => {
            assert_eq!(asset_key, "SOLANA");
            assert!(cause.contains("connection reset"));
        }
        other => panic!("expected venue failure, got {other:?}"),
    }
    assert_eq!(client.call_count(), 1);
}

#[test]
fn single_row_is_normalized_verbatim() {
    let client = MockClient::returning(vec![candle(
        1_700_000_000_000,
        20.0,
        21.0,
        19.5,
        20.5,
        1000.0,
    )]);
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    let series = fetcher.fetch_candles("SOLANA", "1d").expect("fetch");

    assert_eq!(series.len(), 1);
    let row = series.get(0).expect("one candle");
    assert_eq!(row.timestamp_ms, 1_700_000_000_000);
    assert_eq!(row.open, 20.0);
    assert_eq!(row.high, 21.0);
    assert_eq!(row.low, 19.5);
    assert_eq!(row.close, 20.5);
    assert_eq!(row.volume, 1000.0);
}

#[test]
fn row_count_and_order_are_preserved() {
    let rows = vec![
        candle(1_700_000_000_000, 20.0, 21.0, 19.5, 20.5, 1000.0),
        candle(1_700_086_400_000, 20.5, 22.3, 20.1, 22.0, 1430.0),
        candle(1_700_172_800_000, 22.0, 22.8, 21.0, 21.4, 980.0),
    ];
    let client = MockClient::returning(rows.clone());
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    let series = fetcher.fetch_candles("SOLANA", "1d").expect("fetch");

    assert_eq!(series.len(), rows.len());
    assert!(series.is_ascending());
    for (index, expected) in rows.iter().enumerate() {
        let actual = series.get(index).expect("row present");
        assert_eq!(actual, expected);
        assert!(actual.is_well_formed());
    }
}

#[test]
fn identical_inputs_yield_identical_series() {
    let client = MockClient::returning(vec![
        candle(1_700_000_000_000, 20.0, 21.0, 19.5, 20.5, 1000.0),
        candle(1_700_086_400_000, 20.5, 22.3, 20.1, 22.0, 1430.0),
    ]);
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    let first = fetcher.fetch_candles("SOLANA", "1d").expect("first fetch");
    let second = fetcher.fetch_candles("SOLANA", "1d").expect("second fetch");

    assert_eq!(first, second);
    assert_eq!(client.call_count(), 2);
}

#[test]
fn failure_carries_the_asset_key() {
    let client = MockClient::failing("boom");
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    let unknown = fetcher.fetch_candles("DOGE", "1d").expect_err("unmapped");
    assert_eq!(unknown.asset_key(), "DOGE");

    let venue = fetcher.fetch_candles("SOLANA", "1d").expect_err("fails");
    assert_eq!(venue.asset_key(), "SOLANA");
}

#[test]
fn symbol_lookup_matches_the_map() {
    let client = MockClient::returning(Vec::new());
    let fetcher = MarketDataFetcher::new(symbol_map(), &client);

    assert_eq!(fetcher.symbol_for("SOLANA"), Some("SOL/USDT"));
    assert_eq!(fetcher.symbol_for("DOGE"), None);
}
