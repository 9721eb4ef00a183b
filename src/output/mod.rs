//! Console reporting for the `pdfmail` binary.
//!
//! Turns a [`RunSummary`] into either human-readable lines or a JSON
//! document, honoring quiet and verbose modes.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use std::path::Path;

use crate::notify::EmailOutcome;
use crate::pipeline::RunSummary;

/// Display the outcome of a run.
pub fn display_summary(formatter: &OutputFormatter, summary: &RunSummary, log_file: &Path) {
    if summary.dry_run {
        formatter.info("DRY RUN MODE - nothing was written, sent, or moved");
    }

    match (&summary.output, summary.success) {
        (Some(output), true) => {
            formatter.success(&format!(
                "Merged {} of {} files ({} pages) into {}",
                summary.files_merged,
                summary.files_found,
                summary.total_pages,
                output.path.display()
            ));
        }
        _ => {
            formatter.error(&format!(
                "No merged PDF produced: {}",
                summary.failure.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    for skipped in &summary.skipped {
        formatter.warning(&format!(
            "Skipped {}: {:?}",
            skipped.file.name, skipped.reason
        ));
    }

    match &summary.email {
        Some(EmailOutcome::Sent { recipients }) => {
            formatter.success(&format!("Email sent to {recipients} recipients"));
        }
        Some(EmailOutcome::Skipped { reason }) => {
            formatter.warning(&format!("Email not sent: {reason}"));
        }
        Some(EmailOutcome::Failed { reason }) => {
            formatter.warning(&format!("Email failed: {reason}"));
        }
        Some(EmailOutcome::DryRun) | None => {}
    }

    if let Some(archive) = &summary.archive {
        formatter.info(&format!("Archived {} files", archive.archived.len()));
        for entry in &archive.archived {
            formatter.detail(&entry.source.name, &entry.destination.display().to_string());
        }
        for failure in &archive.failed {
            formatter.warning(&format!(
                "Could not archive {}: {}",
                failure.source.name, failure.reason
            ));
        }
    }

    formatter.info(&format!("Check '{}' for details", log_file.display()));
}

/// Render a run as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn summary_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
