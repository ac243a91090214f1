//! Backtesting engine module

pub mod engine;
pub mod metrics;
pub mod report;
pub mod selection;

pub use engine::*;
pub use metrics::*;
pub use report::*;
pub use selection::*;
