//! User-visible record of what an update did.
//!
//! Entries are shown to the user through
//! [`UpdateObserver::on_log`](super::UpdateObserver::on_log) and are also
//! forwarded to `tracing` at debug level, so `--verbose` output carries them too.

use chrono::{DateTime, Local};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One timestamped line of the update log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Append-only list of [`LogEntry`] values.
#[derive(Debug, Clone, Default)]
pub struct UpdateLog {
    entries: Vec<LogEntry>,
}

impl UpdateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry stamped with the current local time.
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>) -> &LogEntry {
        let message = message.into();
        tracing::debug!(?level, "{}", message);
        self.entries.push(LogEntry {
            at: Local::now(),
            level,
            message,
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Whether any entry message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.message.contains(needle))
    }
}
