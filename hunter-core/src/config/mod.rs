//! Configuration module

pub mod backtest;

pub use backtest::*;
