use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use error_stack::{Report, bail};

use crate::error::IndicatorError;

/// Ordered closing prices, oldest first.
///
/// Every indicator reads trailing windows from the newest end, so callers must
/// hand prices over in chronological order. Feeds that arrive newest-first
/// (such as Upbit candle responses) go through [`PriceSeries::from_newest_first`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from closes that are already oldest-first.
    pub fn from_closes(closes: Vec<f64>) -> Result<Self, Report<IndicatorError>> {
        for (index, &value) in closes.iter().enumerate() {
            check_price(index, value)?;
        }
        Ok(Self { closes })
    }

    /// Build a series from closes ordered newest-first, reversing them.
    pub fn from_newest_first(mut closes: Vec<f64>) -> Result<Self, Report<IndicatorError>> {
        closes.reverse();
        Self::from_closes(closes)
    }

    /// Append one close at the newest end.
    pub fn append(&mut self, price: f64) -> Result<(), Report<IndicatorError>> {
        check_price(self.closes.len(), price)?;
        self.closes.push(price);
        Ok(())
    }

    /// The last `k` closes in chronological order.
    ///
    /// Fails rather than returning a shorter slice when fewer than `k` closes
    /// are available.
    pub fn window(&self, k: usize) -> Result<&[f64], Report<IndicatorError>> {
        let available = self.closes.len();
        if available < k {
            bail!(IndicatorError::InsufficientData {
                required: k,
                available,
            });
        }
        Ok(&self.closes[available - k..])
    }

    pub fn latest(&self) -> Result<f64, Report<IndicatorError>> {
        self.closes.last().copied().ok_or_else(|| {
            Report::new(IndicatorError::InsufficientData {
                required: 1,
                available: 0,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.closes
    }
}

fn check_price(index: usize, value: f64) -> Result<(), Report<IndicatorError>> {
    if !value.is_finite() || value <= 0.0 {
        bail!(IndicatorError::InvalidPrice { index, value });
    }
    Ok(())
}

/// A price buffer shared between an ingestion task and readers.
///
/// Appends take the write lock; readers copy the buffer out with
/// [`SharedSeries::snapshot`] so no indicator math runs under the lock.
#[derive(Debug, Clone, Default)]
pub struct SharedSeries {
    inner: Arc<RwLock<Buffer>>,
}

#[derive(Debug, Default)]
struct Buffer {
    closes: VecDeque<f64>,
    // 0 = unbounded
    retention: usize,
}

impl SharedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retention` closes, dropping the oldest. Zero disables the cap.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Buffer {
                closes: VecDeque::new(),
                retention,
            })),
        }
    }

    pub fn append(&self, price: f64) -> Result<(), Report<IndicatorError>> {
        let mut buffer = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        check_price(buffer.closes.len(), price)?;
        buffer.closes.push_back(price);
        if buffer.retention > 0 && buffer.closes.len() > buffer.retention {
            buffer.closes.pop_front();
        }
        Ok(())
    }

    /// Copy the current contents into an owned [`PriceSeries`].
    pub fn snapshot(&self) -> PriceSeries {
        let buffer = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        PriceSeries {
            closes: buffer.closes.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .closes
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
