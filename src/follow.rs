//! Streaming evaluation: an ingestion task appends closes to a
//! [`SharedSeries`] and an analysis loop re-evaluates after every append.

use std::sync::Arc;

use error_stack::{Report, ResultExt, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::IndicatorEngine;
use crate::error::FeedError;
use crate::feed::{FeedFormat, parse_price_line};
use crate::notifier::{Notifier, SignalReport};
use crate::series::SharedSeries;
use crate::signal::SignalState;

/// Follow mode reads one price per line; any other explicit format is refused.
pub fn check_follow_format(requested: Option<&str>) -> Result<(), Report<FeedError>> {
    match requested {
        None => Ok(()),
        Some(name) if FeedFormat::parse(name) == Some(FeedFormat::Lines) => Ok(()),
        Some(name) => bail!(FeedError::UnsupportedFormat {
            name: format!("{name} (follow mode reads `lines` only)"),
        }),
    }
}

/// Read closes line by line, append them to `series`, and send the new
/// length to `tx` after each append.
///
/// Unparseable lines and invalid prices are logged and skipped. Returns the
/// number of closes appended when the reader hits EOF or `cancel` fires.
pub async fn ingest<R>(
    reader: R,
    series: SharedSeries,
    tx: mpsc::Sender<usize>,
    cancel: CancellationToken,
) -> Result<usize, Report<FeedError>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut appended = 0;

    loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("ingestion cancelled");
                break;
            }
            line = lines.next_line() => line.change_context(FeedError::Read)?,
        };
        let Some(line) = line else {
            break;
        };

        let price = match parse_price_line(&line) {
            Ok(Some(price)) => price,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = ?e, "skipping feed line");
                continue;
            }
        };

        if let Err(e) = series.append(price) {
            warn!(error = ?e, "skipping invalid price");
            continue;
        }
        appended += 1;

        if tx.send(series.len()).await.is_err() {
            debug!("analysis loop closed, stopping ingestion");
            break;
        }
    }

    info!(appended, "ingestion finished");
    Ok(appended)
}

/// Re-evaluate the signal every time the ingestion side reports a new close.
///
/// Runs until the sender side is dropped and returns the last signal state.
pub async fn analysis_loop(
    mut rx: mpsc::Receiver<usize>,
    series: SharedSeries,
    engine: IndicatorEngine,
    symbol: String,
    notifier: Arc<dyn Notifier>,
) -> SignalState {
    let mut state = SignalState::Pending;

    while rx.recv().await.is_some() {
        let snapshot = series.snapshot();
        let outcome = engine.compute(&snapshot);

        if let Err(e) = &outcome {
            if !e.current_context().is_insufficient_data() {
                warn!(error = ?e, "indicator calculation failed");
            }
        }

        let previous = state;
        state.observe(&outcome);
        if state != previous {
            info!(symbol = %symbol, from = %previous, to = %state, "signal changed");
        }

        notifier.notify(&SignalReport::new(
            &symbol,
            state,
            snapshot.len(),
            engine.required_prices(),
            outcome.ok(),
        ));
    }

    state
}
