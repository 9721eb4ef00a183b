//! pdfmail - merge the PDFs dropped in a folder, email the result, and
//! archive the inputs.
//!
//! One invocation is one batch run:
//!
//! 1. **Discover** the PDFs directly inside the source folder.
//! 2. **Merge** their pages, in path order, into
//!    `merged_YYYYMMDD_HHMMSS.pdf` in the merged folder. Unreadable inputs
//!    are skipped.
//! 3. **Notify** the configured recipients with the merged PDF attached.
//! 4. **Archive** every discovered input, moving it out of the source folder.
//!
//! A run succeeds when the merged document was produced; email and archive
//! problems are logged but do not change the verdict.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmail::config::Config;
//! use pdfmail::context::{RunContext, SystemClock};
//! use pdfmail::logging::TracingLog;
//! use pdfmail::notify::SmtpMailer;
//! use pdfmail::pipeline::Pipeline;
//! use std::path::Path;
//!
//! # async fn example() -> pdfmail::Result<()> {
//! let config = Config::load(Path::new("config.toml")).await?;
//! pdfmail::bootstrap::ensure_directories(&config.paths).await?;
//!
//! let mailer = SmtpMailer;
//! let ctx = RunContext::new(&TracingLog, &SystemClock);
//! let summary = Pipeline::new(&config, &mailer)?.run(&ctx).await;
//! println!("{} pages merged", summary.total_pages);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod archive;
pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod io;
pub mod logging;
pub mod merge;
pub mod notify;
pub mod output;
pub mod pipeline;

pub use config::Config;
pub use error::{PdfMailError, Result};
pub use pipeline::{Pipeline, RunSummary, Stage};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
