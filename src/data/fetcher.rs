use crate::config::AssetSymbolMap;
use crate::data::market_data::MarketDataClient;
use crate::models::CandleSeries;
use std::fmt;
use tracing::warn;

#[derive(Clone, Debug, PartialEq)]
pub enum FetchError {
    /// The logical key has no symbol-map entry. Detected before any I/O.
    UnknownAsset { asset_key: String },
    /// Anything the venue client surfaced; cause is carried opaquely.
    Venue { asset_key: String, cause: String },
}

impl FetchError {
    pub fn asset_key(&self) -> &str {
        match self {
            FetchError::UnknownAsset { asset_key } => asset_key,
            FetchError::Venue { asset_key, .. } => asset_key,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::UnknownAsset { asset_key } => {
                write!(f, "unknown asset key: {asset_key}")
            }
            FetchError::Venue { asset_key, cause } => {
                write!(f, "fetch failed for {asset_key}: {cause}")
            }
        }
    }
}

impl From<FetchError> for crate::Error {
    fn from(err: FetchError) -> Self {
        crate::Error::new(err.to_string())
    }
}

/// Resolves logical asset keys through the symbol map and fetches candles
/// through the injected client. One blocking request per call, no retry.
pub struct MarketDataFetcher<C> {
    symbols: AssetSymbolMap,
    client: C,
}

impl<C: MarketDataClient> MarketDataFetcher<C> {
    pub fn new(symbols: AssetSymbolMap, client: C) -> Self {
        Self { symbols, client }
    }

    pub fn symbol_for(&self, asset_key: &str) -> Option<&str> {
        self.symbols.get(asset_key).map(String::as_str)
    }

    /// Row count and ordering of the client response are preserved as-is.
    pub fn fetch_candles(
        &self,
        asset_key: &str,
        timeframe: &str,
    ) -> std::result::Result<CandleSeries, FetchError> {
        let Some(symbol) = self.symbols.get(asset_key) else {
            warn!(asset = %asset_key, "asset key not found in symbol map");
            return Err(FetchError::UnknownAsset {
                asset_key: asset_key.to_string(),
            });
        };

        match self.client.fetch_ohlcv(symbol, timeframe) {
            Ok(rows) => Ok(CandleSeries::from_vec(rows)),
            Err(err) => {
                warn!(
                    asset = %asset_key,
                    symbol = %symbol,
                    timeframe = %timeframe,
                    error = %err.message,
                    "candle fetch failed"
                );
                Err(FetchError::Venue {
                    asset_key: asset_key.to_string(),
                    cause: err.message,
                })
            }
        }
    }
}
