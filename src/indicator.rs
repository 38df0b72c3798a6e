pub mod bollinger;
pub mod ma;
pub mod rsi;

use error_stack::{Report, bail};

use crate::error::IndicatorError;
use crate::series::PriceSeries;

/// A technical analysis indicator evaluated at the newest end of a series.
///
/// The series must be in ascending chronological order (oldest first).
pub trait Indicator: Send + Sync {
    /// Unique name of this indicator (e.g., "rsi", "sma").
    fn name(&self) -> &'static str;

    /// Minimum number of closes required to produce a value.
    fn required_prices(&self) -> usize;

    /// Calculate the indicator value for the latest close.
    fn calculate(&self, series: &PriceSeries) -> Result<f64, Report<IndicatorError>>;
}

/// Round to two decimal places for display. Comparisons use the raw value.
pub fn round_display(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn ensure_finite(
    indicator: &'static str,
    value: f64,
) -> Result<f64, Report<IndicatorError>> {
    if !value.is_finite() {
        bail!(IndicatorError::NonFinite { indicator });
    }
    Ok(value)
}

pub(crate) fn check_period(period: usize) -> Result<(), Report<IndicatorError>> {
    if period == 0 {
        bail!(IndicatorError::InvalidParameter {
            name: "period must be > 0".into(),
        });
    }
    Ok(())
}
