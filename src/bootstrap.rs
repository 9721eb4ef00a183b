//! Folder setup before a run.

use crate::config::PathsConfig;
use crate::error::Result;

/// Create every configured folder that does not exist yet.
///
/// Existing folders and their contents are left alone, so calling this on
/// every run is harmless.
///
/// # Errors
///
/// Returns [`crate::PdfMailError::Io`] if a folder cannot be created.
pub async fn ensure_directories(paths: &PathsConfig) -> Result<()> {
    for folder in paths.folders() {
        tokio::fs::create_dir_all(folder).await?;
    }
    Ok(())
}
