//! Hunter-Core: the numeric side of the trend hunter scanner
//!
//! # Features
//!
//! - **Data**: OHLCV candles and ordered candle series
//! - **Indicators**: simple moving average on top of [ta-rs](https://github.com/greyblake/ta-rs)
//! - **Strategy**: binary above/below-average trend state and its crossings
//! - **Backtesting**: compounded trade simulation per window and best-window selection
//! - **Analysis**: last-bar trend status, entry signal and 1.382 extension target
//!
//! # Example
//!
//! ```
//! use hunter_core::prelude::*;
//!
//! let closes: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
//! let engine = BacktestEngine::new(BacktestConfig::default());
//! let selection = select_best_window(&engine, &closes).unwrap();
//! println!("best window {}d -> {:.1}%", selection.best.window, selection.best.fitness_pct);
//! ```

pub mod analysis;
pub mod backtest;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod strategy;

// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::backtest::*;
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::error::*;
    pub use crate::indicators::*;
    pub use crate::strategy::*;
}

pub use error::EngineError;

/// Result type alias
pub type Result<T> = std::result::Result<T, EngineError>;
