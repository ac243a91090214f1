//! Backtesting engine

use crate::backtest::MetricsCalculator;
use crate::config::BacktestConfig;
use crate::strategy::{crossings, trend_states, SignalType};
use crate::Result;

/// Backtest result for a single window
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Moving-average window
    pub window: usize,
    /// Closed trades, plus the open position marked to the last close
    pub trades: Vec<Trade>,
    /// Starting capital
    pub initial_capital: f64,
    /// Compounded terminal capital
    pub final_capital: f64,
    /// Terminal return in percent
    pub fitness_pct: f64,
    /// Share of trades with a positive net return, in percent
    pub win_rate: f64,
    /// Worst peak-to-trough fall of the compounded equity, as a fraction
    pub max_drawdown: f64,
}

/// Trade record
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Return after the per-trade cost
    pub net_return: f64,
    /// Still held at the end of the series
    pub open: bool,
}

/// Backtesting engine
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create new backtest engine
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the above/below-average rule over `closes` for one window.
    ///
    /// Returns `Ok(None)` when the series is too short to produce a single
    /// average value.
    pub fn run(&self, closes: &[f64], window: usize) -> Result<Option<BacktestResult>> {
        let states = trend_states(closes, window)?;
        let last_state = match states.iter().rev().find_map(|s| *s) {
            Some(state) => state,
            None => return Ok(None),
        };
        let signals = crossings(&states);

        let mut trades = Vec::new();
        let mut entry: Option<(usize, f64)> = None;

        for (index, signal) in signals.iter().enumerate() {
            match signal {
                SignalType::Buy => entry = Some((index, closes[index])),
                SignalType::Sell => {
                    // a sell before any buy means the series opened above the average
                    if let Some((entry_index, entry_price)) = entry.take() {
                        if let Some(trade) =
                            self.close_trade(entry_index, entry_price, index, closes[index], false)
                        {
                            trades.push(trade);
                        }
                    }
                }
                SignalType::Hold => {}
            }
        }

        if last_state {
            if let Some((entry_index, entry_price)) = entry {
                let exit_index = closes.len() - 1;
                if let Some(trade) =
                    self.close_trade(entry_index, entry_price, exit_index, closes[exit_index], true)
                {
                    trades.push(trade);
                }
            }
        }

        Ok(Some(self.calculate_results(window, trades)))
    }

    fn close_trade(
        &self,
        entry_index: usize,
        entry_price: f64,
        exit_index: usize,
        exit_price: f64,
        open: bool,
    ) -> Option<Trade> {
        if entry_price == 0.0 {
            return None;
        }
        Some(Trade {
            entry_index,
            exit_index,
            entry_price,
            exit_price,
            net_return: (exit_price - entry_price) / entry_price - self.config.cost_per_trade,
            open,
        })
    }

    /// Calculate backtest results
    fn calculate_results(&self, window: usize, trades: Vec<Trade>) -> BacktestResult {
        let initial_capital = self.config.initial_capital;
        let final_capital = trades
            .iter()
            .fold(initial_capital, |capital, t| capital * (1.0 + t.net_return));
        let fitness_pct = (final_capital / initial_capital - 1.0) * 100.0;

        BacktestResult {
            window,
            win_rate: MetricsCalculator::win_rate(&trades),
            max_drawdown: MetricsCalculator::max_drawdown(&trades),
            trades,
            initial_capital,
            final_capital,
            fitness_pct,
        }
    }
}
