//! Data module
//!
//! OHLCV candles and the ordered series the engine works on.

pub mod candle;

pub use candle::*;
