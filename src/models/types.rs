use serde::Serialize;

/// One OHLCV record. Timestamps are venue open times in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_well_formed(&self) -> bool {
        let max_oc = self.open.max(self.close);
        let min_oc = self.open.min(self.close);
        self.high >= max_oc && self.low <= min_oc && self.high >= self.low && self.volume >= 0.0
    }
}

/// One fetch response for one symbol and timeframe. Row order is whatever
/// the client produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new() -> Self {
        Self {
            candles: Vec::new(),
        }
    }

    pub fn from_vec(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn first(&self) -> Option<&Candle> {
        self.candles.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.candles.iter()
    }

    pub fn is_ascending(&self) -> bool {
        self.candles
            .windows(2)
            .all(|pair| pair[0].timestamp_ms <= pair[1].timestamp_ms)
    }
}

impl From<Vec<Candle>> for CandleSeries {
    fn from(candles: Vec<Candle>) -> Self {
        Self::from_vec(candles)
    }
}
