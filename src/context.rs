//! Per-run collaborators shared by every stage.

use chrono::{DateTime, Local};

use crate::logging::RunLog;

/// Source of wall-clock time for file naming.
pub trait Clock: Send + Sync {
    /// Current local time.
    fn now(&self) -> DateTime<Local>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// What a stage needs besides its own inputs.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    /// Where events are recorded.
    pub log: &'a dyn RunLog,
    /// Time source for output and archive names.
    pub clock: &'a dyn Clock,
    /// Inspect inputs only: write, send, and move nothing.
    pub dry_run: bool,
}

impl<'a> RunContext<'a> {
    /// Create a context for a normal run.
    pub fn new(log: &'a dyn RunLog, clock: &'a dyn Clock) -> Self {
        Self {
            log,
            clock,
            dry_run: false,
        }
    }

    /// Same collaborators, dry-run mode switched on or off.
    pub fn with_dry_run(self, dry_run: bool) -> Self {
        Self { dry_run, ..self }
    }
}
