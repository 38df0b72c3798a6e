use error_stack::{Report, ResultExt};
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::IndicatorError;
use crate::indicator::bollinger::BollingerBands;
use crate::indicator::rsi::Rsi;
use crate::indicator::{Indicator, round_display};
use crate::series::PriceSeries;
use crate::signal::{SignalAction, SignalInputs, SignalThresholds, classify};

/// Indicator values for the newest close, plus the signal derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub rsi: f64,
    pub sma: f64,
    pub std_dev: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub latest_price: f64,
    pub signal: SignalAction,
}

impl IndicatorResult {
    /// RSI rounded to two decimals, for display.
    pub fn rsi_display(&self) -> f64 {
        round_display(self.rsi)
    }
}

/// Computes RSI, SMA and Bollinger Bands over a [`PriceSeries`] and
/// classifies the newest close.
///
/// Holds configuration only. Each call to [`IndicatorEngine::compute`] is
/// independent of every other call.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    rsi: Rsi,
    bollinger: BollingerBands,
    thresholds: SignalThresholds,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            rsi: Rsi::default(),
            bollinger: BollingerBands::default(),
            thresholds: SignalThresholds::default(),
        }
    }
}

impl IndicatorEngine {
    pub fn new(rsi: Rsi, bollinger: BollingerBands, thresholds: SignalThresholds) -> Self {
        Self {
            rsi,
            bollinger,
            thresholds,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Report<IndicatorError>> {
        let indicators = &config.indicators;
        let rsi = Rsi::new(indicators.rsi_period).attach("indicators.rsi_period")?;
        let bollinger =
            BollingerBands::new(indicators.bollinger_period, indicators.std_dev_multiplier)
                .attach("indicators.bollinger_period / std_dev_multiplier")?;
        let thresholds = SignalThresholds {
            oversold: config.signal.oversold,
            overbought: config.signal.overbought,
        };
        Ok(Self::new(rsi, bollinger, thresholds))
    }

    /// Minimum series length for [`IndicatorEngine::compute`] to succeed.
    pub fn required_prices(&self) -> usize {
        self.rsi.required_prices().max(self.bollinger.required_prices())
    }

    /// Compute every indicator for the newest close.
    ///
    /// Either all values are produced or an error is returned; there is no
    /// partial result.
    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorResult, Report<IndicatorError>> {
        let available = series.len();
        let required = self.required_prices();
        if available < required {
            return Err(Report::new(IndicatorError::InsufficientData {
                required,
                available,
            }));
        }

        let rsi = self.rsi.calculate(series)?;
        let bands = self.bollinger.calculate_bands(series)?;
        let latest_price = series.latest()?;

        let signal = classify(
            &SignalInputs {
                rsi,
                latest_price,
                sma: bands.middle,
                bollinger_upper: bands.upper,
                bollinger_lower: bands.lower,
            },
            &self.thresholds,
        );

        debug!(
            rsi,
            sma = bands.middle,
            upper = bands.upper,
            lower = bands.lower,
            latest_price,
            signal = %signal,
            "indicators computed"
        );

        Ok(IndicatorResult {
            rsi,
            sma: bands.middle,
            std_dev: bands.std_dev,
            bollinger_upper: bands.upper,
            bollinger_lower: bands.lower,
            latest_price,
            signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(closes.to_vec()).unwrap()
    }

    fn ramp(from: i32, to_inclusive: i32) -> Vec<f64> {
        (from..=to_inclusive).map(f64::from).collect()
    }

    #[test]
    fn default_engine_requires_twenty_prices() {
        assert_eq!(IndicatorEngine::default().required_prices(), 20);
    }

    #[test]
    fn fewer_than_twenty_prices_is_insufficient() {
        let engine = IndicatorEngine::default();
        let err = engine.compute(&series(&ramp(100, 118))).unwrap_err();
        assert_eq!(
            *err.current_context(),
            IndicatorError::InsufficientData {
                required: 20,
                available: 19,
            }
        );
    }

    #[test]
    fn ramp_then_drop_holds() {
        // 100..=118 then a sharp drop back to 100.
        let mut closes = ramp(100, 118);
        closes.push(100.0);
        let result = IndicatorEngine::default().compute(&series(&closes)).unwrap();

        assert!((result.rsi - 100.0 * 13.0 / 31.0).abs() < 1e-9);
        assert_eq!(result.rsi_display(), 41.94);
        assert!((result.sma - 108.55).abs() < 1e-9);
        assert!((result.std_dev - 5.687486263719676).abs() < 1e-9);
        assert!((result.bollinger_upper - 119.92497252743935).abs() < 1e-9);
        assert!((result.bollinger_lower - 97.17502747256064).abs() < 1e-9);
        assert_eq!(result.latest_price, 100.0);
        assert!(result.latest_price < result.sma);
        assert!(result.latest_price > result.bollinger_lower);
        assert_eq!(result.signal, SignalAction::Hold);
    }

    #[test]
    fn monotonic_rise_sells_on_rsi() {
        let closes = ramp(100, 119);
        let result = IndicatorEngine::default().compute(&series(&closes)).unwrap();

        assert_eq!(result.rsi, 100.0);
        assert_eq!(result.rsi_display(), 100.0);
        assert!((result.sma - 109.5).abs() < 1e-9);
        assert!((result.bollinger_upper - 121.0325625946708).abs() < 1e-9);
        // Sell comes from RSI alone; the close is still inside the bands.
        assert!(result.latest_price < result.bollinger_upper);
        assert_eq!(result.signal, SignalAction::Sell);
    }

    #[test]
    fn fifteen_rising_prices_give_rsi_but_no_result() {
        let s = series(&ramp(100, 114));
        assert_eq!(Rsi::new(14).unwrap().calculate(&s).unwrap(), 100.0);
        let err = IndicatorEngine::default().compute(&s).unwrap_err();
        assert!(err.current_context().is_insufficient_data());
    }

    #[test]
    fn flat_then_crash_buys() {
        let mut closes = vec![100.0; 19];
        closes.push(80.0);
        let result = IndicatorEngine::default().compute(&series(&closes)).unwrap();

        assert_eq!(result.rsi, 0.0);
        assert!((result.sma - 99.0).abs() < 1e-9);
        assert!((result.std_dev - 19.0_f64.sqrt()).abs() < 1e-9);
        assert!((result.bollinger_lower - 90.28220211291865).abs() < 1e-9);
        assert_eq!(result.signal, SignalAction::Buy);
    }

    #[test]
    fn band_breakout_with_moderate_rsi_sells() {
        let mut closes: Vec<f64> = (0..19)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        closes.push(110.0);
        let result = IndicatorEngine::default().compute(&series(&closes)).unwrap();

        assert!((result.rsi - 61.111111111111114).abs() < 1e-9);
        assert!((result.sma - 101.4).abs() < 1e-9);
        assert!((result.std_dev - 2.2).abs() < 1e-9);
        assert!(result.latest_price > result.bollinger_upper);
        assert_eq!(result.signal, SignalAction::Sell);
    }

    #[test]
    fn alternating_prices_hold() {
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        let result = IndicatorEngine::default().compute(&series(&closes)).unwrap();

        assert!((result.rsi - 50.0).abs() < 1e-9);
        assert!((result.sma - 101.0).abs() < 1e-9);
        assert!((result.std_dev - 1.0).abs() < 1e-9);
        assert_eq!(result.signal, SignalAction::Hold);
    }

    #[test]
    fn compute_is_idempotent() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let s = series(&closes);
        let engine = IndicatorEngine::default();
        let first = engine.compute(&s).unwrap();
        let second = engine.compute(&s).unwrap();
        assert_eq!(first.rsi.to_bits(), second.rsi.to_bits());
        assert_eq!(first.sma.to_bits(), second.sma.to_bits());
        assert_eq!(first.std_dev.to_bits(), second.std_dev.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn compute_does_not_mutate_series() {
        let s = series(&ramp(100, 130));
        let before = s.clone();
        IndicatorEngine::default().compute(&s).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn near_max_prices_compute() {
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { f64::MAX / 2.0 } else { f64::MAX / 4.0 })
            .collect();
        let result = IndicatorEngine::default()
            .compute(&series(&closes))
            .unwrap();
        assert!((result.rsi - 50.0).abs() < 1e-9);
        assert!((result.sma / f64::MAX - 0.375).abs() < 1e-12);
        assert!((result.std_dev / f64::MAX - 0.125).abs() < 1e-12);
        assert!(result.bollinger_upper.is_finite());
        assert_eq!(result.signal, SignalAction::Hold);
    }

    #[test]
    fn unrepresentable_band_is_rejected() {
        // Mean ~MAX/2 plus two deviations of ~MAX/2 exceeds f64::MAX.
        let closes: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { f64::MAX } else { 1.0 })
            .collect();
        let err = IndicatorEngine::default()
            .compute(&series(&closes))
            .unwrap_err();
        assert_eq!(
            *err.current_context(),
            IndicatorError::NonFinite {
                indicator: "bollinger"
            }
        );
    }

    #[test]
    fn from_config_uses_configured_periods() {
        let mut config = AppConfig::default();
        config.indicators.rsi_period = 5;
        config.indicators.bollinger_period = 10;
        let engine = IndicatorEngine::from_config(&config).unwrap();
        assert_eq!(engine.required_prices(), 10);
    }

    #[test]
    fn from_config_rejects_zero_period() {
        let mut config = AppConfig::default();
        config.indicators.rsi_period = 0;
        assert!(IndicatorEngine::from_config(&config).is_err());
    }
}
