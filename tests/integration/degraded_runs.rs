//! Runs where something is missing, broken, or unreachable.

use pdfmail::Stage;
use pdfmail::context::{FixedClock, RunContext};
use pdfmail::logging::RecordingLog;
use pdfmail::merge::SkipReason;
use pdfmail::notify::EmailOutcome;
use pdfmail::Pipeline;
use tracing::Level;

use crate::common::{Layout, Outbox, Unreachable, morning, page_count};

#[tokio::test]
async fn test_corrupt_input_is_skipped_but_archived() {
    let layout = Layout::new();
    layout.add_pdf("a.pdf", 2);
    layout.add_raw("broken.pdf", b"this is not a pdf at all");
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(summary.success);
    assert_eq!(summary.files_found, 2);
    assert_eq!(summary.files_merged, 1);
    assert_eq!(summary.total_pages, 2);
    assert_eq!(page_count(&summary.output.as_ref().unwrap().path), 2);

    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].file.name, "broken.pdf");
    assert!(matches!(summary.skipped[0].reason, SkipReason::Corrupt(_)));
    assert!(log.contains(Level::ERROR, "SourceDocumentCorrupt"));

    // Skipped inputs leave the source folder too.
    assert!(layout.source_names().is_empty());
    assert_eq!(layout.archive_names(), vec!["a.pdf", "broken.pdf"]);
}

#[tokio::test]
async fn test_empty_input_is_skipped() {
    let layout = Layout::new();
    layout.add_raw("blank.pdf", b"");
    layout.add_pdf("b.pdf", 1);
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(summary.success);
    assert_eq!(summary.total_pages, 1);
    assert!(log.contains(Level::WARN, "Skipping empty file: blank.pdf"));
    assert_eq!(layout.archive_names(), vec!["b.pdf", "blank.pdf"]);
}

#[tokio::test]
async fn test_empty_source_does_nothing() {
    let layout = Layout::new();
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(!summary.success);
    assert_eq!(summary.exit_code(), 1);
    assert_eq!(summary.reached, Stage::Discovering);
    assert!(summary.output.is_none());
    assert!(summary.email.is_none());
    assert!(summary.archive.is_none());
    assert!(log.contains(Level::INFO, "No PDF files found. Exiting."));
    assert!(layout.merged_names().is_empty());
    assert!(outbox.messages().is_empty());
}

#[tokio::test]
async fn test_all_inputs_corrupt() {
    let layout = Layout::new();
    layout.add_raw("x.pdf", b"garbage");
    layout.add_raw("y.pdf", b"more garbage");
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(!summary.success);
    assert_eq!(summary.reached, Stage::Merging);
    assert!(summary.output.is_none());
    assert!(log.contains(Level::ERROR, "Failed to merge PDFs"));
    assert!(layout.merged_names().is_empty());
    assert!(outbox.messages().is_empty());
    // Nothing is archived when no output exists.
    assert_eq!(layout.source_names(), vec!["x.pdf", "y.pdf"]);
    assert!(layout.archive_names().is_empty());
}

#[tokio::test]
async fn test_unreachable_server_does_not_fail_run() {
    let layout = Layout::new();
    layout.add_pdf("a.pdf", 1);

    let (summary, log) = layout.run(&Unreachable).await;

    assert!(summary.success);
    assert_eq!(summary.exit_code(), 0);
    assert!(matches!(summary.email, Some(EmailOutcome::Failed { .. })));
    assert!(log.contains(Level::ERROR, "EmailDeliveryFailed"));
    assert!(log.contains(Level::INFO, "- Email sent: No"));
    assert_eq!(layout.archive_names(), vec!["a.pdf"]);
    assert_eq!(layout.merged_names().len(), 1);
}

#[tokio::test]
async fn test_incomplete_email_settings_skip_sending() {
    let mut layout = Layout::new();
    layout.config.email.recipients.clear();
    layout.add_pdf("a.pdf", 1);
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(summary.success);
    assert!(matches!(summary.email, Some(EmailOutcome::Skipped { .. })));
    assert!(log.contains(Level::WARN, "recipients"));
    assert!(outbox.messages().is_empty());
    assert_eq!(layout.archive_names(), vec!["a.pdf"]);
}

#[tokio::test]
async fn test_missing_source_folder() {
    let layout = Layout::new();
    std::fs::remove_dir(&layout.config.paths.source_folder).unwrap();
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(!summary.success);
    assert!(log.contains(Level::ERROR, "SourceUnavailable"));
    assert!(log.contains(Level::INFO, "No PDF files found. Exiting."));
}

#[tokio::test]
async fn test_dry_run_leaves_everything_in_place() {
    let layout = Layout::new();
    layout.add_pdf("a.pdf", 2);
    layout.add_pdf("b.pdf", 1);
    let outbox = Outbox::default();

    let log = RecordingLog::new();
    let clock = FixedClock(morning());
    let ctx = RunContext::new(&log, &clock).with_dry_run(true);
    let summary = Pipeline::new(&layout.config, &outbox)
        .unwrap()
        .run(&ctx)
        .await;

    assert!(summary.success);
    assert!(summary.dry_run);
    assert_eq!(summary.total_pages, 3);
    assert_eq!(summary.email, Some(EmailOutcome::DryRun));
    assert!(summary.archive.is_none());
    assert!(log.mentions("Dry run: would write merged_20240309_070501.pdf"));

    assert_eq!(layout.source_names(), vec!["a.pdf", "b.pdf"]);
    assert!(layout.merged_names().is_empty());
    assert!(layout.archive_names().is_empty());
    assert!(outbox.messages().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_dangling_link_does_not_stop_the_run() {
    let layout = Layout::new();
    layout.add_pdf("a.pdf", 1);
    std::os::unix::fs::symlink(layout.source("gone.pdf"), layout.source("b.pdf")).unwrap();
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(summary.success);
    assert_eq!(summary.files_found, 1);
    assert_eq!(summary.total_pages, 1);
    assert!(log.contains(Level::WARN, "b.pdf"));
    assert_eq!(layout.archive_names(), vec!["a.pdf"]);
}
