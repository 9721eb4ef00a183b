//! Run log collaborator.
//!
//! Pipeline stages never call a global logger directly; they record events
//! through a [`RunLog`] handed to them in the run context. The binary wires
//! [`TracingLog`] on top of a `tracing-subscriber` that writes to stderr and
//! to the run log file, while tests use [`RecordingLog`] to assert on what a
//! run reported.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::{Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Sink for one-line run events.
pub trait RunLog: Send + Sync {
    /// Record a single event.
    fn record(&self, level: Level, message: &str);

    /// Record an informational event.
    fn info(&self, message: &str) {
        self.record(Level::INFO, message);
    }

    /// Record a warning.
    fn warn(&self, message: &str) {
        self.record(Level::WARN, message);
    }

    /// Record an error.
    fn error(&self, message: &str) {
        self.record(Level::ERROR, message);
    }

    /// Record a debug event.
    fn debug(&self, message: &str) {
        self.record(Level::DEBUG, message);
    }
}

/// Forwards every record to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl RunLog for TracingLog {
    fn record(&self, level: Level, message: &str) {
        match level {
            Level::ERROR => tracing::error!("{message}"),
            Level::WARN => tracing::warn!("{message}"),
            Level::INFO => tracing::info!("{message}"),
            Level::DEBUG => tracing::debug!("{message}"),
            _ => tracing::trace!("{message}"),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    records: Mutex<Vec<(Level, String)>>,
}

impl RecordingLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|(l, message)| *l == level && message.contains(needle))
    }

    /// Whether any record at any level contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|(_, message)| message.contains(needle))
    }
}

impl RunLog for RecordingLog {
    fn record(&self, level: Level, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push((level, message.to_string()));
        }
    }
}

/// Install the process-wide subscriber: stderr plus an appending log file.
///
/// Stdout stays free for the run summary, which may be JSON. Each sink has
/// its own filter, so `-q` quiets the console without thinning the log file.
/// `RUST_LOG` takes precedence over `console_level` on stderr only.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or a global subscriber
/// is already installed.
pub fn init_tracing(log_file: &Path, console_level: Level, file_level: Level) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    subscriber(file, console_level, file_level).try_init()?;
    Ok(())
}

fn subscriber(file: File, console_level: Level, file_level: Level) -> impl Subscriber + Send + Sync {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_filter(LevelFilter::from_level(file_level)),
        )
}
