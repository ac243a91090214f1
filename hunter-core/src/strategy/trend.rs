//! Moving-average trend state and crossings

use crate::indicators::calculate_sma;
use crate::strategy::SignalType;
use crate::Result;

/// Per-bar position of the close relative to its `window`-bar average.
///
/// `Some(true)` is strictly above, `Some(false)` at or below, `None` while the
/// average is still filling.
pub fn trend_states(closes: &[f64], window: usize) -> Result<Vec<Option<bool>>> {
    let sma = calculate_sma(closes, window)?;
    Ok(closes
        .iter()
        .zip(sma)
        .map(|(close, ma)| ma.map(|ma| *close > ma))
        .collect())
}

/// Turn trend states into crossing signals.
///
/// The first ready bar has nothing to compare against and is always `Hold`.
pub fn crossings(states: &[Option<bool>]) -> Vec<SignalType> {
    let mut previous: Option<bool> = None;
    states
        .iter()
        .map(|state| {
            let signal = match (previous, *state) {
                (Some(false), Some(true)) => SignalType::Buy,
                (Some(true), Some(false)) => SignalType::Sell,
                _ => SignalType::Hold,
            };
            if state.is_some() {
                previous = *state;
            }
            signal
        })
        .collect()
}
