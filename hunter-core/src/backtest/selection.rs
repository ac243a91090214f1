//! Best-window selection

use crate::backtest::{BacktestEngine, BacktestResult};
use crate::error::EngineError;
use crate::Result;
use tracing::debug;

/// Outcome of backtesting every configured window
#[derive(Debug, Clone)]
pub struct WindowSelection {
    /// Window with the highest terminal capital
    pub best: BacktestResult,
    /// Every window that produced a result, in configured order
    pub candidates: Vec<BacktestResult>,
}

/// Backtest each configured window and keep the one with maximal terminal capital.
///
/// Windows longer than the series are skipped. Ties go to the window listed first.
pub fn select_best_window(engine: &BacktestEngine, closes: &[f64]) -> Result<WindowSelection> {
    let mut candidates = Vec::new();
    for &window in &engine.config().windows {
        if let Some(result) = engine.run(closes, window)? {
            candidates.push(result);
        }
    }

    let mut best: Option<&BacktestResult> = None;
    for candidate in &candidates {
        if best.map_or(true, |b| candidate.final_capital > b.final_capital) {
            best = Some(candidate);
        }
    }

    let best = best.cloned().ok_or(EngineError::NoCandidateWindow)?;
    debug!(
        "Best window {}d of {} candidates, capital {:.2}",
        best.window,
        candidates.len(),
        best.final_capital
    );
    Ok(WindowSelection { best, candidates })
}
