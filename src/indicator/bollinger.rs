use error_stack::{Report, bail};
use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicator::ma::{Sma, population_std_dev};
use crate::indicator::{Indicator, ensure_finite};
use crate::series::PriceSeries;

#[derive(Debug, Clone)]
pub struct BollingerBands {
    sma: Sma,
    std_dev_multiplier: f64,
}

/// Bands around the SMA of the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub std_dev: f64,
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Result<Self, Report<IndicatorError>> {
        let sma = Sma::new(period)?;
        if !std_dev_multiplier.is_finite() || std_dev_multiplier <= 0.0 {
            bail!(IndicatorError::InvalidParameter {
                name: "std_dev_multiplier must be > 0".into(),
            });
        }
        Ok(Self {
            sma,
            std_dev_multiplier,
        })
    }

    pub fn period(&self) -> usize {
        self.sma.period()
    }

    /// Returns the bands for the newest window.
    pub fn calculate_bands(&self, series: &PriceSeries) -> Result<Bands, Report<IndicatorError>> {
        let middle = self.sma.calculate(series)?;
        let window = series.window(self.period())?;

        let std_dev = ensure_finite(self.name(), population_std_dev(window, middle))?;
        let upper = ensure_finite(self.name(), middle + self.std_dev_multiplier * std_dev)?;
        let lower = ensure_finite(self.name(), middle - self.std_dev_multiplier * std_dev)?;

        Ok(Bands {
            upper,
            middle,
            lower,
            std_dev,
        })
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            sma: Sma::default(),
            std_dev_multiplier: 2.0,
        }
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &'static str {
        "bollinger"
    }

    fn required_prices(&self) -> usize {
        self.period()
    }

    /// Returns the middle band (SMA) only.
    fn calculate(&self, series: &PriceSeries) -> Result<f64, Report<IndicatorError>> {
        Ok(self.calculate_bands(series)?.middle)
    }
}
