//! Backtest report generation

use crate::backtest::{BacktestResult, WindowSelection};

/// Backtest report over every candidate window of one ticker
#[derive(Debug)]
pub struct BacktestReport<'a> {
    symbol: &'a str,
    selection: &'a WindowSelection,
}

impl<'a> BacktestReport<'a> {
    pub fn new(symbol: &'a str, selection: &'a WindowSelection) -> Self {
        Self { symbol, selection }
    }

    fn format_line(result: &BacktestResult) -> String {
        format!(
            "{:>3}d  capital {:>8.2}  return {:>7.1}%  trades {:>3}  win {:>5.1}%  mdd {:>5.1}%",
            result.window,
            result.final_capital,
            result.fitness_pct,
            result.trades.len(),
            result.win_rate,
            result.max_drawdown * 100.0,
        )
    }

    /// Format report as string
    pub fn format(&self) -> String {
        let mut out = format!(
            "Backtest {} (best {}d)\n",
            self.symbol, self.selection.best.window
        );
        for candidate in &self.selection.candidates {
            out.push_str(&Self::format_line(candidate));
            out.push('\n');
        }
        out
    }
}
