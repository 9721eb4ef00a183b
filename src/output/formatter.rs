//! Console messages for the `pdfmail` binary.
//!
//! The run log is the record of a run; this is only what the operator sees
//! on the terminal when invoking the tool by hand.
//!
//! ```
//! use pdfmail::output::OutputFormatter;
//!
//! let console = OutputFormatter::new(false, false);
//! console.info("Merging 3 files");
//! console.success("Email sent");
//! ```

use std::io::IsTerminal;

/// Kind of console message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Plain progress line.
    Info,
    /// Green check mark.
    Success,
    /// Shown even in quiet mode.
    Warning,
    /// Shown even in quiet mode.
    Error,
    /// Verbose mode only.
    Debug,
}

impl MessageLevel {
    fn decoration(self) -> (&'static str, &'static str) {
        match self {
            MessageLevel::Info => ("", ""),
            MessageLevel::Success => ("✓ ", "\x1b[32m"),
            MessageLevel::Warning => ("⚠ ", "\x1b[33m"),
            MessageLevel::Error => ("✗ ", "\x1b[31m"),
            MessageLevel::Debug => ("→ ", "\x1b[36m"),
        }
    }
}

/// Prints console messages according to the verbosity flags.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a formatter. `quiet` leaves only warnings and errors.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: std::io::stdout().is_terminal() && std::env::var_os("TERM").is_some(),
        }
    }

    /// Format a message the way it would be printed, without printing it.
    pub fn render(&self, level: MessageLevel, message: &str) -> String {
        let (prefix, color) = level.decoration();
        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn emit(&self, level: MessageLevel, message: &str) {
        let shown = match level {
            MessageLevel::Warning | MessageLevel::Error => true,
            MessageLevel::Debug => self.verbose,
            MessageLevel::Info | MessageLevel::Success => !self.quiet,
        };
        if shown {
            println!("{}", self.render(level, message));
        }
    }

    /// Print an informational line.
    pub fn info(&self, message: &str) {
        self.emit(MessageLevel::Info, message);
    }

    /// Print a success line.
    pub fn success(&self, message: &str) {
        self.emit(MessageLevel::Success, message);
    }

    /// Print a warning.
    pub fn warning(&self, message: &str) {
        self.emit(MessageLevel::Warning, message);
    }

    /// Print an error.
    pub fn error(&self, message: &str) {
        self.emit(MessageLevel::Error, message);
    }

    /// Print a verbose-only line.
    pub fn debug(&self, message: &str) {
        self.emit(MessageLevel::Debug, message);
    }

    /// Print a titled block header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print an indented `label: value` line. Verbose mode only.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Whether quiet mode is on.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Whether verbose mode is on.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
