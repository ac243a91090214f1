//! Last-bar analysis: trend status, entry signal and extension target

use crate::data::CandleSeries;
use crate::error::EngineError;
use crate::indicators::calculate_sma;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Lookback for the swing low used by the extension target
pub const SWING_LOOKBACK: usize = 20;

/// Fibonacci extension applied above the swing low
pub const EXTENSION_RATIO: f64 = 1.382;

/// Close relative to the gene's moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    Strong,
    Weak,
}

/// Entry timing on the last bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntrySignal {
    /// Up bar on rising volume inside an uptrend
    Ambush,
    Watch,
}

/// Snapshot of the last bar against a moving-average window
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub last_price: f64,
    /// `None` while the series is shorter than the window
    pub moving_average: Option<f64>,
    pub status: TrendStatus,
    pub signal: EntrySignal,
    pub target: f64,
}

/// `low + (last - low) * 1.382` over the last [`SWING_LOOKBACK`] lows, rounded to cents.
pub fn fib_target(lows: &[f64], last_close: f64) -> Option<f64> {
    let start = lows.len().saturating_sub(SWING_LOOKBACK);
    let swing_low = lows[start..].iter().copied().reduce(f64::min)?;
    let target = swing_low + (last_close - swing_low) * EXTENSION_RATIO;
    Some((target * 100.0).round() / 100.0)
}

/// Evaluate the last bar of `series` against a `window`-bar moving average.
///
/// A series shorter than the window has no average and reads as [`TrendStatus::Weak`].
pub fn evaluate(series: &CandleSeries, window: usize) -> Result<PriceSnapshot> {
    let last = series.last().ok_or(EngineError::InsufficientHistory {
        needed: window,
        available: 0,
    })?;

    let moving_average = calculate_sma(&series.closes(), window)?
        .last()
        .copied()
        .flatten();

    let status = match moving_average {
        Some(ma) if last.close > ma => TrendStatus::Strong,
        _ => TrendStatus::Weak,
    };

    let volume_rising = series
        .previous()
        .map_or(false, |prev| last.volume > prev.volume);
    let signal = if last.is_bullish() && volume_rising && status == TrendStatus::Strong {
        EntrySignal::Ambush
    } else {
        EntrySignal::Watch
    };

    let target = fib_target(&series.lows(), last.close).unwrap_or(last.close);

    Ok(PriceSnapshot {
        last_price: last.close,
        moving_average,
        status,
        signal,
        target,
    })
}
