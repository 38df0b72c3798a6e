use chrono::{DateTime, Utc};
use serde::Serialize;

/// One closing price as delivered by a feed.
///
/// Plain price lists carry no timestamp; Upbit candles do.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub open_time: Option<DateTime<Utc>>,
    pub close: f64,
}

impl Candle {
    pub fn untimed(close: f64) -> Self {
        Self {
            open_time: None,
            close,
        }
    }
}

/// Extract close prices from a slice of candles.
pub fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_prices_keeps_order() {
        let candles = [Candle::untimed(3.0), Candle::untimed(1.0), Candle::untimed(2.0)];
        assert_eq!(close_prices(&candles), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn candle_serializes_missing_time_as_null() {
        let json = serde_json::to_string(&Candle::untimed(1.5)).unwrap();
        assert_eq!(json, r#"{"open_time":null,"close":1.5}"#);
    }
}
