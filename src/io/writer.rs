//! Saving the merged document.
//!
//! The document is serialized next to its destination as `<name>.tmp` and
//! renamed into place, so the merged folder never holds a half-written PDF
//! that could be mailed or picked up by someone else.
//!
//! ```no_run
//! use pdfmail::io::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # async fn example(doc: Document) -> pdfmail::Result<()> {
//! let written = PdfWriter::new()
//!     .save(doc, Path::new("merged_pdfs/merged_20240101_080000.pdf"))
//!     .await?;
//! println!("{} bytes", written.file_size);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{PdfMailError, Result};

/// How the document is serialized.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    /// Deflate uncompressed streams first.
    pub compress: bool,
    /// Go through a temporary file and rename it into place.
    pub atomic: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: true,
            atomic: true,
        }
    }
}

/// What ended up on disk.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Final location.
    pub output_path: PathBuf,
    /// Bytes on disk.
    pub file_size: u64,
    /// Serialization plus rename.
    pub write_time: Duration,
}

/// Writes documents to disk on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Writer with compression and atomic replace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with explicit options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Serialize `doc` to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMailError::FailedToWrite`] if the file cannot be created,
    /// serialized, or moved into place. A failed attempt leaves no temporary
    /// file behind.
    pub async fn save(&self, doc: Document, path: &Path) -> Result<WriteStatistics> {
        let options = self.options;
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || write_blocking(doc, path, options))
            .await
            .map_err(|e| PdfMailError::other(format!("Write task failed: {e}")))?
    }
}

fn write_blocking(mut doc: Document, path: PathBuf, options: WriteOptions) -> Result<WriteStatistics> {
    let started = Instant::now();
    if options.compress {
        doc.compress();
    }

    let staging = if options.atomic {
        path.with_extension("tmp")
    } else {
        path.clone()
    };

    if let Err(source) = serialize(&mut doc, &staging) {
        if options.atomic {
            let _ = std::fs::remove_file(&staging);
        }
        return Err(PdfMailError::FailedToWrite { path, source });
    }

    if options.atomic
        && let Err(source) = std::fs::rename(&staging, &path)
    {
        let _ = std::fs::remove_file(&staging);
        return Err(PdfMailError::FailedToWrite { path, source });
    }

    let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    Ok(WriteStatistics {
        output_path: path,
        file_size,
        write_time: started.elapsed(),
    })
}

fn serialize(doc: &mut Document, target: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(target)?);
    doc.save_to(&mut out)
        .map_err(|e| io::Error::other(e.to_string()))?;
    out.flush()
}
