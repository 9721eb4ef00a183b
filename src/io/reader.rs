//! PDF loading.
//!
//! Decoding is CPU-bound and synchronous in `lopdf`, so each load runs on the
//! blocking pool and is awaited before the next one starts.
//!
//! ```no_run
//! # async fn example() -> pdfmail::Result<()> {
//! let scan = pdfmail::io::PdfReader::new()
//!     .load(std::path::Path::new("incoming_pdfs/scan.pdf"))
//!     .await?;
//! assert!(scan.page_count > 0);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::error::{PdfMailError, Result};

/// An input decoded into memory, ready to be folded into the merge.
#[derive(Debug)]
pub struct LoadedPdf {
    /// Decoded object graph.
    pub document: Document,
    /// Where it was read from.
    pub path: PathBuf,
    /// Leaf pages reachable from the catalog.
    pub page_count: usize,
    /// Read plus decode.
    pub load_time: Duration,
}

/// Loads PDF documents from disk.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Read and decode one input.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMailError::SourceDocumentCorrupt`] if the file cannot be
    /// read or is not a decodable PDF.
    pub async fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();

        task::spawn_blocking(move || {
            let start = Instant::now();

            let document = Document::load(&path_buf)
                .map_err(|e| PdfMailError::corrupt(path_buf.clone(), e.to_string()))?;
            let page_count = document.get_pages().len();

            Ok::<_, PdfMailError>(LoadedPdf {
                document,
                path: path_buf,
                page_count,
                load_time: start.elapsed(),
            })
        })
        .await
        .map_err(|e| PdfMailError::other(format!("Load task failed: {e}")))?
    }

    /// Size of the file in bytes, or `None` if it cannot be stat'ed.
    pub async fn file_size(&self, path: &Path) -> Option<u64> {
        tokio::fs::metadata(path).await.ok().map(|m| m.len())
    }
}
