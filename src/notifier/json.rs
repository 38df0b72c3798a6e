use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::notifier::{Notifier, SignalReport};

/// Writes one JSON object per report, newline-delimited.
pub struct JsonNotifier<W> {
    out: Mutex<W>,
}

impl JsonNotifier<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonNotifier<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for JsonNotifier<W> {
    fn notify(&self, report: &SignalReport) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let written = serde_json::to_writer(&mut *out, report)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(out))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write signal report");
        }
    }
}
