use std::fmt;

use error_stack::Report;
use serde::Serialize;

use crate::engine::IndicatorResult;
use crate::error::IndicatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::Hold => write!(f, "hold"),
        }
    }
}

/// RSI levels used by the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// Everything the classifier looks at, all taken from the same window.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs {
    pub rsi: f64,
    pub latest_price: f64,
    pub sma: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
}

/// Classify the latest observation. Rules are checked in order and the first
/// match wins: oversold below the lower band is a buy, overbought or above the
/// upper band is a sell, anything else holds.
pub fn classify(inputs: &SignalInputs, thresholds: &SignalThresholds) -> SignalAction {
    let SignalInputs {
        rsi,
        latest_price,
        sma,
        bollinger_upper,
        bollinger_lower,
    } = *inputs;

    if rsi < thresholds.oversold && latest_price < bollinger_lower && latest_price < sma {
        return SignalAction::Buy;
    }
    if rsi > thresholds.overbought || latest_price > bollinger_upper {
        return SignalAction::Sell;
    }
    SignalAction::Hold
}

/// Caller-side view of the signal across recomputations.
///
/// Starts `Pending` and becomes `Ready` on the first successful computation.
/// Failed computations leave the state untouched; successful ones replace it
/// outright, with no memory of the previous action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "action", rename_all = "snake_case")]
pub enum SignalState {
    #[default]
    Pending,
    Ready(SignalAction),
}

impl SignalState {
    pub fn observe(&mut self, outcome: &Result<IndicatorResult, Report<IndicatorError>>) {
        if let Ok(result) = outcome {
            *self = Self::Ready(result.signal);
        }
    }

    pub fn action(&self) -> Option<SignalAction> {
        match self {
            Self::Pending => None,
            Self::Ready(action) => Some(*action),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Ready(action) => write!(f, "{action}"),
        }
    }
}
