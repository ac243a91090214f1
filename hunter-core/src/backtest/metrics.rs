//! Backtest performance metrics

use crate::backtest::Trade;

/// Calculate summary metrics from a trade list
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Percentage of trades with a positive net return
    pub fn win_rate(trades: &[Trade]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        let winners = trades.iter().filter(|t| t.net_return > 0.0).count();
        winners as f64 / trades.len() as f64 * 100.0
    }

    /// Maximum drawdown of the trade-by-trade compounded equity curve
    pub fn max_drawdown(trades: &[Trade]) -> f64 {
        let mut max_drawdown: f64 = 0.0;
        let mut peak = 1.0;
        let mut equity = 1.0;

        for trade in trades {
            equity *= 1.0 + trade.net_return;
            if equity > peak {
                peak = equity;
            }
            max_drawdown = max_drawdown.max((peak - equity) / peak);
        }

        max_drawdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(net_return: f64) -> Trade {
        Trade {
            entry_index: 0,
            exit_index: 1,
            entry_price: 1.0,
            exit_price: 1.0 + net_return,
            net_return,
            open: false,
        }
    }

    #[test]
    fn test_win_rate() {
        assert_eq!(MetricsCalculator::win_rate(&[]), 0.0);
        let trades = [trade(0.1), trade(-0.05), trade(0.02), trade(-0.01)];
        assert_eq!(MetricsCalculator::win_rate(&trades), 50.0);
    }

    #[test]
    fn test_max_drawdown() {
        // 1.0 -> 1.5 -> 0.75 -> 0.825
        let trades = [trade(0.5), trade(-0.5), trade(0.1)];
        assert!((MetricsCalculator::max_drawdown(&trades) - 0.5).abs() < 1e-12);
        assert_eq!(MetricsCalculator::max_drawdown(&[trade(0.1)]), 0.0);
    }
}
