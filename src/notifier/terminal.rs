use crate::notifier::{Notifier, SignalReport};
use crate::signal::{SignalAction, SignalState};

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, report: &SignalReport) {
        let (SignalState::Ready(action), Some(result)) = (report.state, report.result.as_ref())
        else {
            tracing::info!(
                symbol = %report.symbol,
                available = report.available,
                required = report.required,
                "signal pending"
            );
            return;
        };

        match action {
            SignalAction::Buy | SignalAction::Sell => tracing::warn!(
                symbol = %report.symbol,
                rsi = result.rsi_display(),
                sma = result.sma,
                upper = result.bollinger_upper,
                lower = result.bollinger_lower,
                price = result.latest_price,
                "SIGNAL: {action}",
            ),
            SignalAction::Hold => tracing::info!(
                symbol = %report.symbol,
                rsi = result.rsi_display(),
                sma = result.sma,
                upper = result.bollinger_upper,
                lower = result.bollinger_lower,
                price = result.latest_price,
                "signal: {action}",
            ),
        }
    }
}
