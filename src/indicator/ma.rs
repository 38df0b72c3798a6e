use error_stack::Report;

use crate::error::IndicatorError;
use crate::indicator::{Indicator, check_period, ensure_finite};
use crate::series::PriceSeries;

/// Simple Moving Average.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, Report<IndicatorError>> {
        check_period(period)?;
        Ok(Self { period })
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for Sma {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &'static str {
        "sma"
    }

    fn required_prices(&self) -> usize {
        self.period
    }

    fn calculate(&self, series: &PriceSeries) -> Result<f64, Report<IndicatorError>> {
        let window = series.window(self.period)?;
        ensure_finite(self.name(), mean(window))
    }
}

pub fn mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / n;
    }
    // The plain sum overflowed; every finite input still has a finite mean.
    values.iter().map(|&p| p / n).sum()
}

/// Population standard deviation (divisor `values.len()`) around `mean`.
///
/// Deviations are normalised by the largest one before squaring, so the
/// result stays finite for any finite window.
pub fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let scale = values
        .iter()
        .map(|&p| (p - mean).abs())
        .fold(0.0_f64, f64::max);
    if scale == 0.0 {
        return 0.0;
    }
    let n = values.len() as f64;
    let variance = values
        .iter()
        .map(|&p| ((p - mean) / scale).powi(2) / n)
        .sum::<f64>();
    scale * variance.sqrt()
}
