//! Input discovery.
//!
//! Lists the PDFs sitting directly in the source folder. Subfolders are not
//! descended into, and the result is ordered by path so that merge order and
//! archive order are the same on every platform.

use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{PdfMailError, Result};
use crate::logging::RunLog;

/// A file picked up for this run.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct InputFile {
    /// Absolute path at discovery time.
    pub path: PathBuf,
    /// File name including extension.
    pub name: String,
}

impl InputFile {
    /// Build an input from a path, taking its file name as the base name.
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }
}

/// Lists candidate inputs in one folder.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    matcher: GlobMatcher,
}

impl FileDiscovery {
    /// Create a discovery for the given file-name glob (e.g. `*.pdf`).
    ///
    /// Matching ignores case, so `SCAN.PDF` is picked up as well.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid glob.
    pub fn new(pattern: &str) -> Result<Self> {
        let matcher = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| PdfMailError::invalid_config(format!("Invalid pattern {pattern}: {e}")))?
            .compile_matcher();
        Ok(Self { matcher })
    }

    /// List the matching files directly inside `source_dir`, sorted by path.
    ///
    /// An entry that cannot be read (a dangling symlink, say) is logged to
    /// `log` and left out; the rest of the folder is still listed.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMailError::SourceUnavailable`] if `source_dir` does not
    /// exist or is not a folder, and [`PdfMailError::Io`] if the folder
    /// itself cannot be listed.
    pub fn discover(&self, source_dir: &Path, log: &dyn RunLog) -> Result<Vec<InputFile>> {
        if !source_dir.is_dir() {
            return Err(PdfMailError::source_unavailable(source_dir.to_path_buf()));
        }

        let root = std::path::absolute(source_dir)?;
        let mut files = Vec::new();

        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => return Err(std::io::Error::from(err).into()),
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    log.warn(&format!("Skipping unreadable entry {path}: {err}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            if self.matcher.is_match(entry.file_name()) {
                files.push(InputFile::new(entry.into_path()));
            }
        }

        files.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));

        Ok(files)
    }
}
