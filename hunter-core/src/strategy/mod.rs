//! Strategy module
//!
//! The trend-following rule: long while the close is above its moving average.

pub mod base;
pub mod trend;

pub use base::*;
pub use trend::*;
