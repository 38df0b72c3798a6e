pub mod json;
pub mod terminal;

use serde::Serialize;

use crate::engine::IndicatorResult;
use crate::signal::SignalState;

/// What a caller knows about the signal after one evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct SignalReport {
    pub symbol: String,
    #[serde(flatten)]
    pub state: SignalState,
    /// Closes seen so far.
    pub available: usize,
    /// Closes the engine needs before it can decide.
    pub required: usize,
    pub rsi_display: Option<f64>,
    pub result: Option<IndicatorResult>,
}

impl SignalReport {
    pub fn new(
        symbol: &str,
        state: SignalState,
        available: usize,
        required: usize,
        result: Option<IndicatorResult>,
    ) -> Self {
        Self {
            symbol: symbol.to_owned(),
            state,
            available,
            required,
            rsi_display: result.as_ref().map(IndicatorResult::rsi_display),
            result,
        }
    }
}

/// Sink for signal reports.
pub trait Notifier: Send + Sync {
    fn notify(&self, report: &SignalReport);
}
