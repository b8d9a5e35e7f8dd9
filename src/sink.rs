//! Output sink for human-facing status lines.
//!
//! The catalog never prints. Status lines (registration confirmations,
//! cancellation banners, event descriptions) go to a [`StatusSink`]; any
//! console, log or UI layer can implement it.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Receiver of status lines.
pub trait StatusSink: fmt::Debug + Send + Sync {
    /// Emits one status line (may contain embedded newlines).
    fn emit(&self, line: &str);
}

/// Forwards every line to `tracing` at `INFO` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl StatusSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!(target: "event_catalog::status", "{line}");
    }
}

/// Keeps every emitted line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatusSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}
