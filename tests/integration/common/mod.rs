//! Shared helpers for the integration tests.
//!
//! PDFs are generated on the fly with lopdf, so no binary fixtures are
//! checked in.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use lettre::Message;
use lopdf::{Document, Object, Stream, dictionary};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use pdfmail::config::{Config, EmailConfig};
use pdfmail::context::{FixedClock, RunContext};
use pdfmail::logging::RecordingLog;
use pdfmail::notify::MailTransport;
use pdfmail::{PdfMailError, Pipeline, RunSummary};

/// 2024-03-09 07:05:01 local time.
pub fn morning() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap()
}

/// Write a valid PDF with `pages` A4 pages.
///
/// Page `i` shows `<file stem> page <i>`, so merged output can be traced
/// back to its inputs with [`page_labels`].
pub fn write_pdf(path: &Path, pages: usize) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let text = format!("BT /F1 12 Tf 72 720 Td ({stem} page {i}) Tj ET");
            let content_id = doc.add_object(Stream::new(dictionary! {}, text.into_bytes()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(595),
                Object::Integer(842),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc.save(path).expect("Failed to write test PDF");
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: &Path) -> usize {
    Document::load(path)
        .expect("Failed to load PDF")
        .get_pages()
        .len()
}

/// Label of every page in the PDF at `path`, in page order.
pub fn page_labels(path: &Path) -> Vec<String> {
    let doc = Document::load(path).expect("Failed to load PDF");
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let content = doc.get_page_content(page_id).expect("Failed to read page");
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').expect("No text on page") + 1;
            let end = text[start..].find(')').expect("Unterminated text") + start;
            text[start..end].to_string()
        })
        .collect()
}

/// Sorted file names inside `dir`.
pub fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to list folder")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A throwaway folder layout with a complete email section.
pub struct Layout {
    _root: TempDir,
    pub config: Config,
}

impl Layout {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.paths.source_folder = root.path().join("incoming_pdfs");
        config.paths.archive_folder = root.path().join("archive");
        config.paths.merged_folder = root.path().join("merged_pdfs");
        config.paths.log_folder = root.path().join("logs");
        for folder in config.paths.folders() {
            std::fs::create_dir_all(folder).unwrap();
        }
        config.email = EmailConfig {
            smtp_server: "smtp.example.com".to_string(),
            sender_email: "bot@example.com".to_string(),
            recipients: vec!["ops@example.com".to_string(), "desk@example.com".to_string()],
            ..EmailConfig::default()
        };
        Self {
            _root: root,
            config,
        }
    }

    pub fn source(&self, name: &str) -> PathBuf {
        self.config.paths.source_folder.join(name)
    }

    pub fn add_pdf(&self, name: &str, pages: usize) {
        write_pdf(&self.source(name), pages);
    }

    pub fn add_raw(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.source(name), bytes).unwrap();
    }

    pub fn source_names(&self) -> Vec<String> {
        names_in(&self.config.paths.source_folder)
    }

    pub fn archive_names(&self) -> Vec<String> {
        names_in(&self.config.paths.archive_folder)
    }

    pub fn merged_names(&self) -> Vec<String> {
        names_in(&self.config.paths.merged_folder)
    }

    /// Run the pipeline once at `at`, returning the summary and the log.
    pub async fn run_at(
        &self,
        transport: &dyn MailTransport,
        at: DateTime<Local>,
    ) -> (RunSummary, RecordingLog) {
        let log = RecordingLog::new();
        let clock = FixedClock(at);
        let ctx = RunContext::new(&log, &clock);
        let summary = Pipeline::new(&self.config, transport)
            .expect("Failed to build pipeline")
            .run(&ctx)
            .await;
        (summary, log)
    }

    pub async fn run(&self, transport: &dyn MailTransport) -> (RunSummary, RecordingLog) {
        self.run_at(transport, morning()).await
    }
}

/// Accepts every message and keeps its rendered form.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<String>>,
}

impl Outbox {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for Outbox {
    async fn send(&self, _email: &EmailConfig, message: Message) -> pdfmail::Result<()> {
        let raw = String::from_utf8_lossy(&message.formatted()).into_owned();
        self.sent.lock().unwrap().push(raw);
        Ok(())
    }
}

/// Rejects every message the way an unreachable server would.
pub struct Unreachable;

#[async_trait]
impl MailTransport for Unreachable {
    async fn send(&self, email: &EmailConfig, _message: Message) -> pdfmail::Result<()> {
        Err(PdfMailError::delivery_failed(format!(
            "Connection refused: {}:{}",
            email.smtp_server, email.smtp_port
        )))
    }
}
