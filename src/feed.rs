//! Offline decoders for the price feeds the binary accepts.
//!
//! Every decoder yields candles oldest-first. The Upbit decoder is the only
//! one that has to reorder: the exchange returns candles newest-first.

use std::fmt;

use chrono::NaiveDateTime;
use error_stack::{Report, ResultExt, bail};
use serde::Deserialize;

use crate::error::FeedError;
use crate::model::{Candle, close_prices};
use crate::series::PriceSeries;

const UPBIT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    /// JSON array of numbers, oldest first.
    Closes,
    /// JSON array of Upbit candles, newest first.
    Upbit,
    /// One price per line, oldest first.
    Lines,
}

impl FeedFormat {
    /// Parse a command-line format name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "closes" => Some(Self::Closes),
            "upbit" => Some(Self::Upbit),
            "lines" => Some(Self::Lines),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closes => "closes",
            Self::Upbit => "upbit",
            Self::Lines => "lines",
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode a whole feed into candles, oldest first.
pub fn decode(format: FeedFormat, input: &str) -> Result<Vec<Candle>, Report<FeedError>> {
    match format {
        FeedFormat::Closes => decode_closes(input),
        FeedFormat::Upbit => decode_upbit(input),
        FeedFormat::Lines => decode_lines(input),
    }
}

/// Decode a whole feed straight into a validated [`PriceSeries`].
pub fn decode_series(format: FeedFormat, input: &str) -> Result<PriceSeries, Report<FeedError>> {
    let candles = decode(format, input)?;
    PriceSeries::from_closes(close_prices(&candles)).change_context(FeedError::InvalidPrice)
}

/// Parse a single line of a `lines` feed. Blank lines and `#` comments yield `None`.
pub fn parse_price_line(line: &str) -> Result<Option<f64>, Report<FeedError>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    trimmed
        .parse::<f64>()
        .map(Some)
        .change_context(FeedError::Parse {
            reason: "expected a number".into(),
        })
        .attach_with(|| format!("line: {trimmed:?}"))
}

fn decode_closes(input: &str) -> Result<Vec<Candle>, Report<FeedError>> {
    let closes: Vec<f64> = serde_json::from_str(input).change_context(FeedError::Parse {
        reason: "expected a JSON array of numbers".into(),
    })?;
    Ok(closes.into_iter().map(Candle::untimed).collect())
}

fn decode_lines(input: &str) -> Result<Vec<Candle>, Report<FeedError>> {
    let mut candles = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let price = parse_price_line(line).attach_with(|| format!("line number: {}", number + 1))?;
        if let Some(price) = price {
            candles.push(Candle::untimed(price));
        }
    }
    Ok(candles)
}

fn decode_upbit(input: &str) -> Result<Vec<Candle>, Report<FeedError>> {
    let raw: Vec<UpbitCandle> = serde_json::from_str(input).change_context(FeedError::Parse {
        reason: "expected a JSON array of Upbit candles".into(),
    })?;

    let mut candles = raw
        .into_iter()
        .map(UpbitCandle::into_candle)
        .collect::<Result<Vec<_>, _>>()?;

    // Upbit returns newest-first; anything else would silently invert the series.
    for (position, pair) in candles.windows(2).enumerate() {
        if pair[0].open_time <= pair[1].open_time {
            bail!(FeedError::Ordering {
                position: position + 1,
            });
        }
    }

    candles.reverse();
    Ok(candles)
}

// ── Upbit response types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UpbitCandle {
    candle_date_time_utc: String,
    trade_price: f64,
}

impl UpbitCandle {
    fn into_candle(self) -> Result<Candle, Report<FeedError>> {
        let open_time = NaiveDateTime::parse_from_str(&self.candle_date_time_utc, UPBIT_TIME_FORMAT)
            .change_context(FeedError::Parse {
                reason: "invalid candle_date_time_utc".into(),
            })
            .attach_with(|| format!("value: {}", self.candle_date_time_utc))?
            .and_utc();

        Ok(Candle {
            open_time: Some(open_time),
            close: self.trade_price,
        })
    }
}
