//! RSI / SMA / Bollinger Band signal engine for a single daily price series.
//!
//! The core ([`series`], [`indicator`], [`engine`], [`signal`]) is synchronous
//! and free of I/O. The outer modules decode feeds, load configuration and
//! report results for the `coin-signal` binary.

pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod follow;
pub mod indicator;
pub mod model;
pub mod notifier;
pub mod series;
pub mod signal;

pub use engine::{IndicatorEngine, IndicatorResult};
pub use error::IndicatorError;
pub use series::{PriceSeries, SharedSeries};
pub use signal::{SignalAction, SignalState, SignalThresholds};
