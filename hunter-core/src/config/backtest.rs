//! Backtest configuration

use serde::{Deserialize, Serialize};

/// Windows tried when picking a ticker's gene
pub const DEFAULT_WINDOWS: [usize; 3] = [10, 20, 60];

/// Backtest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Candidate moving-average windows, in tie-break order
    pub windows: Vec<usize>,
    /// Round-trip transaction cost per trade (e.g., 0.004 = 0.4%)
    pub cost_per_trade: f64,
    /// Starting capital for the compounded simulation
    pub initial_capital: f64,
    /// Window used when no backtested gene is known
    pub default_window: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS.to_vec(),
            cost_per_trade: 0.004,
            initial_capital: 100.0,
            default_window: 20,
        }
    }
}
