//! Loading a configuration file and running from it.

use pdfmail::bootstrap::ensure_directories;
use pdfmail::config::Config;
use pdfmail::PdfMailError;
use tempfile::TempDir;

use crate::common::{Outbox, write_pdf};

fn config_text(root: &std::path::Path) -> String {
    format!(
        r#"
[paths]
source_folder = "{root}/incoming_pdfs"
archive_folder = "{root}/archive"
merged_folder = "{root}/merged_pdfs"
log_folder = "{root}/logs"

[email]
smtp_server = "smtp.example.com"
smtp_port = 2525
sender_email = "bot@example.com"
recipients = "ops@example.com, desk@example.com"
subject = "Scans of the day"
"#,
        root = root.display().to_string().replace('\\', "/")
    )
}

#[tokio::test]
async fn test_run_from_config_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("config.toml");
    std::fs::write(&path, config_text(root.path())).unwrap();

    let config = Config::load(&path).await.unwrap();
    assert_eq!(config.email.smtp_port, 2525);
    assert_eq!(
        config.email.recipients,
        vec!["ops@example.com", "desk@example.com"]
    );

    ensure_directories(&config.paths).await.unwrap();
    for folder in config.paths.folders() {
        assert!(folder.is_dir());
    }

    write_pdf(&config.paths.source_folder.join("scan.pdf"), 4);

    let outbox = Outbox::default();
    let log = pdfmail::logging::RecordingLog::new();
    let clock = pdfmail::context::FixedClock(crate::common::morning());
    let ctx = pdfmail::context::RunContext::new(&log, &clock);
    let summary = pdfmail::Pipeline::new(&config, &outbox)
        .unwrap()
        .run(&ctx)
        .await;

    assert!(summary.success);
    assert_eq!(summary.total_pages, 4);
    let messages = outbox.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Subject: Scans of the day"));
}

#[tokio::test]
async fn test_missing_config_file() {
    let root = TempDir::new().unwrap();
    let err = Config::load(&root.path().join("config.toml"))
        .await
        .unwrap_err();

    assert!(matches!(err, PdfMailError::ConfigNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("config.example.toml"));
}

#[tokio::test]
async fn test_malformed_config_file() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("config.toml");
    std::fs::write(&path, "[paths\nsource_folder = ").unwrap();

    let err = Config::load(&path).await.unwrap_err();

    assert!(matches!(err, PdfMailError::InvalidConfig { .. }));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_shipped_example_config_parses() {
    let example = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
    let config = Config::load(&example).await.unwrap();

    assert_eq!(config.paths.source_folder, std::path::PathBuf::from("incoming_pdfs"));
    assert_eq!(config.email.smtp_port, 587);
    assert!(!config.email.recipients.is_empty());
}
