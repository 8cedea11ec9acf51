pub mod types;

pub use types::{Candle, CandleSeries};
