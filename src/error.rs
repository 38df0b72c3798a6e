use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum FeedError {
    #[display("failed to read price feed")]
    Read,
    #[display("failed to parse price feed: {reason}")]
    Parse { reason: String },
    #[display("feed is not ordered newest-first at position {position}")]
    Ordering { position: usize },
    #[display("feed contains an invalid price")]
    InvalidPrice,
    #[display("unsupported feed format: {name}")]
    UnsupportedFormat { name: String },
}

/// Errors produced by the series buffer and the indicator engine.
///
/// A zero average loss in RSI is not an error: it resolves to 100 inside
/// the RSI calculation and never surfaces here.
#[derive(Debug, Display, Error, Clone, PartialEq)]
pub enum IndicatorError {
    #[display("insufficient data: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
    #[display("invalid price {value} at index {index}: must be positive and finite")]
    InvalidPrice { index: usize, value: f64 },
    #[display("{indicator} produced a non-finite value")]
    NonFinite { indicator: &'static str },
}

impl IndicatorError {
    /// `true` when the caller should simply wait for more prices and retry.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
