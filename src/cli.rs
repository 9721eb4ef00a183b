//! Command-line interface for pdfmail.
//!
//! Everything about *what* to process lives in the configuration file; the
//! command line only says which file to use and how to report.

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// Merge the PDFs waiting in a folder, email the result, and archive the
/// inputs.
///
/// Meant to be run on a schedule (cron, systemd timer, Task Scheduler).
/// Exits with status 0 when a merged PDF was produced, even if the email
/// could not be sent, and 1 otherwise.
#[derive(Parser, Debug)]
#[command(name = "pdfmail")]
#[command(version)]
#[command(about = "Merge PDFs from a folder, email the result, archive the inputs", long_about = None)]
pub struct Cli {
    /// Configuration file
    ///
    /// TOML file with a [paths] and an [email] table.
    /// See config.example.toml for every key.
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "PDFMAIL_CONFIG",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    /// Dry run - load and merge in memory without writing, sending, or moving
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the run summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Verbose output - debug-level logging and per-file details
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode - only warnings and errors on the console
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Default console level when `RUST_LOG` is unset.
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    /// Level for the log file. `--quiet` never lowers it below info.
    pub fn file_log_level(&self) -> Level {
        if self.verbose { Level::DEBUG } else { Level::INFO }
    }
}
