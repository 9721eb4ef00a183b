//! Runs where every stage has something to do.

use pdfmail::Stage;
use pdfmail::notify::EmailOutcome;
use tracing::Level;

use crate::common::{Layout, Outbox, page_count, page_labels};

#[tokio::test]
async fn test_merge_mail_and_archive() {
    let layout = Layout::new();
    layout.add_pdf("a.pdf", 2);
    layout.add_pdf("b.pdf", 3);
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    assert!(summary.success);
    assert_eq!(summary.exit_code(), 0);
    assert_eq!(summary.reached, Stage::Archiving);
    assert_eq!(summary.files_found, 2);
    assert_eq!(summary.files_merged, 2);
    assert_eq!(summary.total_pages, 5);

    assert_eq!(layout.merged_names(), vec!["merged_20240309_070501.pdf"]);
    let output = summary.output.as_ref().unwrap();
    assert_eq!(page_count(&output.path), 5);

    assert_eq!(summary.email, Some(EmailOutcome::Sent { recipients: 2 }));
    let messages = outbox.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("merged_20240309_070501.pdf"));
    assert!(messages[0].contains("ops@example.com"));
    assert!(messages[0].contains("desk@example.com"));

    assert!(layout.source_names().is_empty());
    assert_eq!(layout.archive_names(), vec!["a.pdf", "b.pdf"]);
    assert_eq!(summary.archived_count(), 2);

    assert!(log.contains(Level::INFO, "Found 2 PDF files"));
    assert!(log.contains(Level::INFO, "Added: a.pdf (2 pages)"));
    assert!(log.contains(Level::INFO, "Added: b.pdf (3 pages)"));
    assert!(log.contains(Level::INFO, "Process completed successfully!"));
    assert!(log.contains(Level::INFO, "- Email sent: Yes"));
    assert!(log.contains(Level::INFO, "- Output: merged_20240309_070501.pdf"));
}

#[tokio::test]
async fn test_pages_follow_path_order() {
    let layout = Layout::new();
    // Created in reverse so creation order and path order disagree.
    layout.add_pdf("b.pdf", 2);
    layout.add_pdf("a.pdf", 1);
    let outbox = Outbox::default();

    let (summary, log) = layout.run(&outbox).await;

    let output = summary.output.expect("merged output");
    assert_eq!(
        page_labels(&output.path),
        vec!["a page 0", "b page 0", "b page 1"]
    );

    let added: Vec<String> = log
        .records()
        .into_iter()
        .map(|(_, message)| message)
        .filter(|message| message.starts_with("Added: "))
        .collect();
    assert_eq!(added, vec!["Added: a.pdf (1 pages)", "Added: b.pdf (2 pages)"]);
}

#[tokio::test]
async fn test_non_pdf_files_stay_put() {
    let layout = Layout::new();
    layout.add_pdf("a.pdf", 1);
    layout.add_raw("notes.txt", b"remember the milk");
    let outbox = Outbox::default();

    let (summary, _) = layout.run(&outbox).await;

    assert!(summary.success);
    assert_eq!(summary.files_found, 1);
    assert_eq!(layout.source_names(), vec!["notes.txt"]);
    assert_eq!(layout.archive_names(), vec!["a.pdf"]);
}

#[tokio::test]
async fn test_archive_name_collision_keeps_both() {
    let layout = Layout::new();
    let outbox = Outbox::default();

    layout.add_pdf("report.pdf", 1);
    let (first, _) = layout.run(&outbox).await;
    assert!(first.success);

    layout.add_pdf("report.pdf", 2);
    let next_day = crate::common::morning() + chrono::Duration::days(1);
    let (second, _) = layout.run_at(&outbox, next_day).await;
    assert!(second.success);

    assert_eq!(
        layout.archive_names(),
        vec!["report.pdf", "report_070501.pdf"]
    );
    assert_eq!(
        layout.merged_names(),
        vec!["merged_20240309_070501.pdf", "merged_20240310_070501.pdf"]
    );
}
