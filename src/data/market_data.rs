use crate::models::Candle;
use crate::Result;

/// Pre-configured venue client. Implementations own credentials, sandbox
/// mode, and request spacing.
pub trait MarketDataClient {
    fn fetch_ohlcv(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>>;
}

impl<T: MarketDataClient + ?Sized> MarketDataClient for &T {
    fn fetch_ohlcv(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>> {
        (**self).fetch_ohlcv(symbol, timeframe)
    }
}
