use proptest::prelude::*;

use coin_signal::indicator::Indicator;
use coin_signal::indicator::bollinger::BollingerBands;
use coin_signal::indicator::ma::Sma;
use coin_signal::indicator::rsi::Rsi;
use coin_signal::{IndicatorEngine, PriceSeries, SignalAction};

fn closes(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..1_000_000.0f64, min_len..max_len)
}

fn series(closes: Vec<f64>) -> PriceSeries {
    PriceSeries::from_closes(closes).unwrap()
}

proptest! {
    /// RSI stays inside [0, 100] for any valid series long enough to compute it.
    #[test]
    fn rsi_is_bounded(prices in closes(15, 200)) {
        let rsi = Rsi::new(14).unwrap().calculate(&series(prices)).unwrap();
        prop_assert!((0.0..=100.0).contains(&rsi), "rsi out of range: {rsi}");
    }

    /// Short series fail instead of computing over a partial window.
    #[test]
    fn short_series_are_insufficient(prices in closes(0, 20)) {
        let len = prices.len();
        let s = series(prices);
        let engine = IndicatorEngine::default();

        let err = engine.compute(&s).unwrap_err();
        prop_assert!(err.current_context().is_insufficient_data());
        prop_assert!(Sma::new(20).unwrap().calculate(&s).is_err());
        if len < 15 {
            prop_assert!(Rsi::new(14).unwrap().calculate(&s).is_err());
        }
    }

    /// Prepending older history never changes any indicator value.
    #[test]
    fn results_ignore_older_history(
        history in closes(0, 50),
        recent in closes(20, 40),
    ) {
        let engine = IndicatorEngine::default();
        let base = engine.compute(&series(recent.clone())).unwrap();

        let mut extended = history;
        extended.extend_from_slice(&recent);
        let with_history = engine.compute(&series(extended)).unwrap();

        prop_assert_eq!(base, with_history);
    }

    /// Computing twice over the same series is bit-for-bit identical.
    #[test]
    fn compute_is_idempotent(prices in closes(20, 100)) {
        let s = series(prices);
        let engine = IndicatorEngine::default();
        let first = engine.compute(&s).unwrap();
        let second = engine.compute(&s).unwrap();
        prop_assert_eq!(first.rsi.to_bits(), second.rsi.to_bits());
        prop_assert_eq!(first.sma.to_bits(), second.sma.to_bits());
        prop_assert_eq!(first.std_dev.to_bits(), second.std_dev.to_bits());
        prop_assert_eq!(first.signal, second.signal);
    }

    /// SMA equals the mean of exactly the last 20 closes.
    #[test]
    fn sma_is_mean_of_last_twenty(prices in closes(20, 100)) {
        let expected = prices[prices.len() - 20..].iter().sum::<f64>() / 20.0;
        let sma = Sma::new(20).unwrap().calculate(&series(prices)).unwrap();
        prop_assert!((sma - expected).abs() <= expected.abs() * 1e-12);
    }

    /// Bands are symmetric around the SMA and the deviation is never negative.
    #[test]
    fn bands_are_symmetric(prices in closes(20, 100)) {
        let bands = BollingerBands::new(20, 2.0)
            .unwrap()
            .calculate_bands(&series(prices))
            .unwrap();
        prop_assert!(bands.std_dev >= 0.0);
        prop_assert!(bands.lower <= bands.middle && bands.middle <= bands.upper);
        let tolerance = bands.middle.abs() * 1e-9 + 1e-9;
        prop_assert!(((bands.upper - bands.middle) - (bands.middle - bands.lower)).abs() <= tolerance);
    }

    /// A window with no losses always reads as RSI 100 and therefore never buys.
    #[test]
    fn loss_free_window_is_overbought(start in 1.0f64..1000.0, steps in prop::collection::vec(0.0f64..10.0, 19)) {
        let mut prices = vec![start];
        for step in steps {
            let next = prices[prices.len() - 1] + step;
            prices.push(next);
        }
        let result = IndicatorEngine::default().compute(&series(prices)).unwrap();
        prop_assert_eq!(result.rsi, 100.0);
        prop_assert_eq!(result.signal, SignalAction::Sell);
    }

    /// A window with at least one loss and no gains reads as RSI 0, even when
    /// some changes are zero.
    #[test]
    fn gain_free_window_is_zero(
        start in 500.0f64..1000.0,
        steps in prop::collection::vec(prop_oneof![Just(0.0f64), 0.01f64..10.0], 13),
        last_drop in 0.01f64..10.0,
    ) {
        let mut prices = vec![start];
        for step in steps.into_iter().chain(std::iter::once(last_drop)) {
            let next = prices[prices.len() - 1] - step;
            prices.push(next);
        }
        let rsi = Rsi::new(14).unwrap().calculate(&series(prices)).unwrap();
        prop_assert_eq!(rsi, 0.0);
    }

    /// RSI stays bounded and finite for prices close to f64::MAX.
    #[test]
    fn rsi_is_bounded_near_max(
        prices in prop::collection::vec(1.0f64..f64::MAX, 15..60),
    ) {
        let rsi = Rsi::new(14).unwrap().calculate(&series(prices)).unwrap();
        prop_assert!((0.0..=100.0).contains(&rsi), "rsi out of range: {rsi}");
    }

    /// The full engine succeeds on huge prices whose bands are representable.
    #[test]
    fn engine_handles_huge_prices(
        prices in prop::collection::vec((f64::MAX / 4.0)..(f64::MAX / 2.0), 20..60),
    ) {
        let result = IndicatorEngine::default().compute(&series(prices)).unwrap();
        prop_assert!((0.0..=100.0).contains(&result.rsi));
        prop_assert!(result.bollinger_upper.is_finite());
        prop_assert!(result.bollinger_lower <= result.sma && result.sma <= result.bollinger_upper);
    }
}
