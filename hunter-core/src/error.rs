//! Engine errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid moving-average window: {0}")]
    InvalidWindow(usize),

    #[error("insufficient history: need {needed} rows, have {available}")]
    InsufficientHistory { needed: usize, available: usize },

    #[error("no candidate window could be backtested")]
    NoCandidateWindow,
}
