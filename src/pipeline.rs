//! The batch run: discover, merge, notify, archive.
//!
//! Stages run once each, in that order, and never loop back. Only two things
//! end a run early as a failure: discovery finding nothing, and the merge
//! producing no output. Email and archive problems are recorded in the
//! summary and logged, but a run whose merge succeeded is a successful run.

use serde::Serialize;

use crate::archive::{ArchiveReport, Archiver};
use crate::config::Config;
use crate::context::RunContext;
use crate::discovery::FileDiscovery;
use crate::error::{PdfMailError, Result};
use crate::merge::{MergedOutput, Merger, SkippedInput};
use crate::notify::{EmailOutcome, MailTransport, Notifier};

/// Position of a run in the linear stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Not started.
    Idle,
    /// Listing the source folder.
    Discovering,
    /// Building the merged document.
    Merging,
    /// Mailing the merged document.
    Notifying,
    /// Moving inputs to the archive.
    Archiving,
    /// Finished, successfully or not.
    Done,
}

/// Everything a run reports.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Last working stage entered before the run finished.
    pub reached: Stage,
    /// Whether a merged output was produced.
    pub success: bool,
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Inputs discovered.
    pub files_found: usize,
    /// Inputs whose pages made it into the output.
    pub files_merged: usize,
    /// Pages in the output.
    pub total_pages: usize,
    /// The merged document, if one was produced.
    pub output: Option<MergedOutput>,
    /// Inputs that contributed nothing.
    pub skipped: Vec<SkippedInput>,
    /// Email result, if the notify stage ran.
    pub email: Option<EmailOutcome>,
    /// Archive result, if the archive stage ran.
    pub archive: Option<ArchiveReport>,
    /// Why the run failed.
    pub failure: Option<String>,
}

impl RunSummary {
    fn new(dry_run: bool) -> Self {
        Self {
            reached: Stage::Idle,
            success: false,
            dry_run,
            files_found: 0,
            files_merged: 0,
            total_pages: 0,
            output: None,
            skipped: Vec::new(),
            email: None,
            archive: None,
            failure: None,
        }
    }

    /// Whether the email went out.
    pub fn email_sent(&self) -> bool {
        self.email.as_ref().is_some_and(EmailOutcome::is_sent)
    }

    /// Number of inputs moved to the archive.
    pub fn archived_count(&self) -> usize {
        self.archive.as_ref().map_or(0, |a| a.archived.len())
    }

    /// Number of inputs that could not be archived.
    pub fn archive_failures(&self) -> usize {
        self.archive.as_ref().map_or(0, |a| a.failed.len())
    }

    /// Process exit code: 0 iff a merged output was produced.
    pub fn exit_code(&self) -> i32 {
        if self.success { 0 } else { 1 }
    }
}

/// Sequences the four stages for one configuration.
pub struct Pipeline<'a> {
    config: &'a Config,
    discovery: FileDiscovery,
    merger: Merger,
    notifier: Notifier<'a>,
    archiver: Archiver,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline that mails through `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMailError::InvalidConfig`] if the discovery pattern is
    /// not a valid glob.
    pub fn new(config: &'a Config, transport: &'a dyn MailTransport) -> Result<Self> {
        Ok(Self {
            config,
            discovery: FileDiscovery::new(&config.paths.pattern)?,
            merger: Merger::new(),
            notifier: Notifier::new(transport),
            archiver: Archiver::new(),
        })
    }

    /// Execute one run.
    pub async fn run(&self, ctx: &RunContext<'_>) -> RunSummary {
        let paths = &self.config.paths;
        let mut summary = RunSummary::new(ctx.dry_run);

        ctx.log.info(&"=".repeat(50));
        ctx.log.info("Starting PDF merge process");

        enter(&mut summary, Stage::Discovering, ctx);
        let files = match self.discovery.discover(&paths.source_folder, ctx.log) {
            Ok(files) => files,
            // A missing folder is reported and treated as an empty one.
            Err(err) => {
                ctx.log.error(&format!("{}: {err}", err.kind()));
                Vec::new()
            }
        };
        summary.files_found = files.len();
        ctx.log.info(&format!("Found {} PDF files", files.len()));

        if files.is_empty() {
            ctx.log.info("No PDF files found. Exiting.");
            return fail(
                summary,
                PdfMailError::NoFilesFound {
                    path: paths.source_folder.clone(),
                },
                ctx,
            );
        }

        enter(&mut summary, Stage::Merging, ctx);
        let report = match self.merger.merge(&files, &paths.merged_folder, ctx).await {
            Ok(report) => report,
            Err(err) => {
                ctx.log.error(&format!("Failed to merge PDFs: {}: {err}", err.kind()));
                return fail(summary, err, ctx);
            }
        };
        summary.files_merged = report.output.source_count;
        summary.total_pages = report.total_pages;
        summary.skipped = report.skipped;
        summary.success = true;

        if ctx.dry_run {
            ctx.log.info(&format!(
                "Dry run: would write {} ({} pages) and archive {} files",
                report.output.file_name(),
                report.total_pages,
                files.len()
            ));
            summary.output = Some(report.output);
            summary.email = Some(EmailOutcome::DryRun);
            return finish(summary, ctx);
        }

        enter(&mut summary, Stage::Notifying, ctx);
        let email = self
            .notifier
            .notify(Some(&report.output), &self.config.email, ctx)
            .await;
        summary.email = Some(email);
        summary.output = Some(report.output);

        // Runs whatever the email outcome was.
        enter(&mut summary, Stage::Archiving, ctx);
        let archive = self
            .archiver
            .archive_all(&files, &paths.archive_folder, ctx)
            .await;
        summary.archive = Some(archive);

        ctx.log.info("Process completed successfully!");
        ctx.log.info(&format!(
            "- Merged {} of {} files",
            summary.files_merged, summary.files_found
        ));
        ctx.log.info(&format!(
            "- Email sent: {}",
            if summary.email_sent() { "Yes" } else { "No" }
        ));
        if let Some(output) = &summary.output {
            ctx.log.info(&format!("- Output: {}", output.file_name()));
        }
        if summary.archive_failures() > 0 {
            ctx.log.warn(&format!(
                "- {} files could not be archived",
                summary.archive_failures()
            ));
        }

        finish(summary, ctx)
    }
}

fn enter(summary: &mut RunSummary, stage: Stage, ctx: &RunContext<'_>) {
    ctx.log
        .debug(&format!("Stage {:?} -> {stage:?}", summary.reached));
    summary.reached = stage;
}

fn fail(mut summary: RunSummary, err: PdfMailError, ctx: &RunContext<'_>) -> RunSummary {
    summary.success = false;
    summary.failure = Some(err.to_string());
    finish(summary, ctx)
}

fn finish(summary: RunSummary, ctx: &RunContext<'_>) -> RunSummary {
    ctx.log.debug(&format!(
        "Stage {:?} -> {:?} (success: {})",
        summary.reached,
        Stage::Done,
        summary.success
    ));
    summary
}
