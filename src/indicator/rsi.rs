use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period, ensure_finite};
use crate::series::PriceSeries;

/// RSI (Relative Strength Index) over the trailing `period` changes.
///
/// Gains and losses are averaged with a plain arithmetic mean over the window,
/// not Wilder's smoothing, so the value depends only on the last
/// `period + 1` closes.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(period)?;
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Calculate RSI from a price window (internal helper).
    ///
    /// `prices` must hold exactly `period + 1` closes.
    fn calculate_window(&self, prices: &[f64]) -> f64 {
        let period = self.period as f64;
        // Each change is scaled before accumulating so that near-f64::MAX
        // prices cannot overflow the running totals.
        let (avg_gain, avg_loss) = prices
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0_f64, 0.0_f64), |(gain, loss), delta| {
                (
                    gain + delta.max(0.0) / period,
                    loss + (-delta).max(0.0) / period,
                )
            });

        rsi_value(avg_gain, avg_loss)
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &'static str {
        "rsi"
    }

    fn required_prices(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, series: &PriceSeries) -> Result<f64, Report<IndicatorError>> {
        let window = series.window(self.required_prices())?;
        ensure_finite(self.name(), self.calculate_window(window))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    // A window without losses is maximally overbought, including a flat one.
    if avg_loss == 0.0 {
        return 100.0;
    }
    if avg_gain == 0.0 {
        return 0.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
