//! Archiving of processed inputs.
//!
//! Every input of the run is moved out of the source folder, whether or not
//! it contributed pages. A name already taken in the archive gets the time of
//! day appended (`report_071502.pdf`), then a counter if that is taken too;
//! nothing already archived is ever replaced.

use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::discovery::InputFile;
use crate::error::PdfMailError;

/// Where an input ended up.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArchiveEntry {
    /// The input as discovered.
    pub source: InputFile,
    /// Its path inside the archive folder.
    pub destination: PathBuf,
}

/// An input that could not be moved.
#[derive(Debug, serde::Serialize)]
pub struct ArchiveFailure {
    /// The input as discovered.
    pub source: InputFile,
    /// Error message.
    pub reason: String,
}

/// Outcome of archiving a batch.
#[derive(Debug, Default, serde::Serialize)]
pub struct ArchiveReport {
    /// Inputs moved into the archive.
    pub archived: Vec<ArchiveEntry>,
    /// Inputs left where they were.
    pub failed: Vec<ArchiveFailure>,
}

/// Moves inputs into the archive folder.
#[derive(Debug, Clone, Default)]
pub struct Archiver;

impl Archiver {
    /// Create a new archiver.
    pub fn new() -> Self {
        Self
    }

    /// Move every file into `archive_dir`, best effort.
    ///
    /// A failure on one file is logged and does not stop the others.
    pub async fn archive_all(
        &self,
        files: &[InputFile],
        archive_dir: &Path,
        ctx: &RunContext<'_>,
    ) -> ArchiveReport {
        let mut report = ArchiveReport::default();

        for file in files {
            match self.archive(file, archive_dir, ctx).await {
                Ok(entry) => {
                    ctx.log.info(&format!("Archived: {}", entry.source.name));
                    report.archived.push(entry);
                }
                Err(err) => {
                    ctx.log.error(&format!("{}: {err}", err.kind()));
                    report.failed.push(ArchiveFailure {
                        source: file.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        report
    }

    async fn archive(
        &self,
        file: &InputFile,
        archive_dir: &Path,
        ctx: &RunContext<'_>,
    ) -> Result<ArchiveEntry, PdfMailError> {
        let failed = |source: io::Error| PdfMailError::ArchiveMoveFailed {
            path: file.path.clone(),
            source,
        };

        let destination = free_destination(archive_dir, &file.name, ctx.clock.now())
            .await
            .map_err(failed)?;
        move_file(&file.path, &destination).await.map_err(failed)?;

        Ok(ArchiveEntry {
            source: file.clone(),
            destination,
        })
    }
}

/// `report.pdf` at 07:15:02 becomes `report_071502.pdf`.
pub fn timestamped_name(name: &str, at: DateTime<Local>) -> String {
    suffixed_name(name, &at.format("%H%M%S").to_string())
}

fn suffixed_name(name: &str, suffix: &str) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    }
}

/// First name in `archive_dir` that nothing occupies.
async fn free_destination(
    archive_dir: &Path,
    name: &str,
    at: DateTime<Local>,
) -> io::Result<PathBuf> {
    let plain = archive_dir.join(name);
    if !tokio::fs::try_exists(&plain).await? {
        return Ok(plain);
    }

    let stamped = archive_dir.join(timestamped_name(name, at));
    if !tokio::fs::try_exists(&stamped).await? {
        return Ok(stamped);
    }

    let time = at.format("%H%M%S").to_string();
    let mut counter = 1u32;
    loop {
        let candidate = archive_dir.join(suffixed_name(name, &format!("{time}_{counter}")));
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Rename, or copy then delete when the archive sits on another filesystem.
async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::CrossesDevices => {
            tokio::fs::copy(from, to).await?;
            tokio::fs::remove_file(from).await
        }
        Err(err) => Err(err),
    }
}
