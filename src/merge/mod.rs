//! PDF merging operations.
//!
//! Concatenates the pages of the discovered inputs, document by document and
//! page by page, into one new PDF named after the run's start time.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmail::context::{RunContext, SystemClock};
//! use pdfmail::discovery::InputFile;
//! use pdfmail::logging::TracingLog;
//! use pdfmail::merge::Merger;
//! use std::path::{Path, PathBuf};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let files = vec![InputFile::new(PathBuf::from("a.pdf")), InputFile::new(PathBuf::from("b.pdf"))];
//! let ctx = RunContext::new(&TracingLog, &SystemClock);
//!
//! let report = Merger::new().merge(&files, Path::new("merged_pdfs"), &ctx).await?;
//! println!("Merged {} pages into {}", report.total_pages, report.output.path.display());
//! # Ok(())
//! # }
//! ```

pub mod merger;

pub use merger::{MergeReport, MergedOutput, Merger, SkipReason, SkippedInput, output_file_name};
