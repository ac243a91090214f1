//! Signal types shared by the trend rule and the backtest engine

/// Signal emitted on a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalType {
    /// Close crossed above the average
    Buy,
    /// Close crossed back to or below the average
    Sell,
    /// No transition on this bar
    Hold,
}
