//! Error types for pdfmail.
//!
//! Every condition the batch can run into is a variant of [`PdfMailError`].
//! Whether a condition stops the run is decided by the stage that meets it;
//! [`PdfMailError::is_fatal`] names the ones that end a run as a failure.
//!
//! # Error Categories
//!
//! - **Discovery**: source folder missing, nothing to merge
//! - **Merge**: unreadable inputs, empty output, output write failures
//! - **Email**: incomplete settings, delivery failures
//! - **Archive**: per-file move failures
//! - **Configuration**: missing or invalid config file

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmail operations.
pub type Result<T> = std::result::Result<T, PdfMailError>;

/// Main error type for pdfmail operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfMailError {
    /// The source folder does not exist or cannot be listed.
    #[error("Source folder not found: {}", path.display())]
    SourceUnavailable {
        /// Path of the source folder.
        path: PathBuf,
    },

    /// Discovery found no matching files.
    #[error("No PDF files found in {}", path.display())]
    NoFilesFound {
        /// Path of the source folder.
        path: PathBuf,
    },

    /// An input could not be loaded or decoded.
    #[error("Error reading {}: {reason}", path.display())]
    SourceDocumentCorrupt {
        /// Path of the input.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// No input contributed a single page.
    #[error("Merge produced no pages; no output written")]
    MergeProducedEmptyOutput,

    /// The merged document could not be written.
    #[error("Failed to write merged PDF: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Email settings are missing a required value.
    #[error("Email configuration incomplete: {missing}. Skipping email")]
    EmailConfigIncomplete {
        /// Which setting is missing.
        missing: String,
    },

    /// Building or delivering the email failed.
    #[error("Error sending email: {reason}")]
    EmailDeliveryFailed {
        /// What went wrong.
        reason: String,
    },

    /// An input could not be moved into the archive folder.
    #[error("Error archiving {}: {source}", path.display())]
    ArchiveMoveFailed {
        /// Path of the input.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The configuration file does not exist.
    #[error(
        "Configuration file not found: {}\n  \
         Hint: copy config.example.toml to {} and edit it",
        path.display(),
        path.display()
    )]
    ConfigNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The configuration file did not parse or failed validation.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong, prefixed with the file path.
        message: String,
    },

    /// Filesystem error outside the stages' own handling.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Anything else, such as a panicked blocking task.
    #[error("{message}")]
    Other {
        /// What happened.
        message: String,
    },
}

impl From<lopdf::Error> for PdfMailError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfMailError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfMailError {
    /// Create a SourceUnavailable error.
    pub fn source_unavailable(path: PathBuf) -> Self {
        Self::SourceUnavailable { path }
    }

    /// Create a SourceDocumentCorrupt error.
    pub fn corrupt(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::SourceDocumentCorrupt {
            path,
            reason: reason.into(),
        }
    }

    /// Create an EmailConfigIncomplete error.
    pub fn email_incomplete(missing: impl Into<String>) -> Self {
        Self::EmailConfigIncomplete {
            missing: missing.into(),
        }
    }

    /// Create an EmailDeliveryFailed error.
    pub fn delivery_failed(reason: impl ToString) -> Self {
        Self::EmailDeliveryFailed {
            reason: reason.to_string(),
        }
    }

    /// Create an InvalidConfig error from a validation message.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Name of the condition as it appears in run log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "SourceUnavailable",
            Self::NoFilesFound { .. } => "NoFilesFound",
            Self::SourceDocumentCorrupt { .. } => "SourceDocumentCorrupt",
            Self::MergeProducedEmptyOutput => "MergeProducedEmptyOutput",
            Self::FailedToWrite { .. } => "FailedToWrite",
            Self::EmailConfigIncomplete { .. } => "EmailConfigIncomplete",
            Self::EmailDeliveryFailed { .. } => "EmailDeliveryFailed",
            Self::ArchiveMoveFailed { .. } => "ArchiveMoveFailed",
            Self::ConfigNotFound { .. } => "ConfigNotFound",
            Self::InvalidConfig { .. } => "InvalidConfig",
            Self::Io { .. } => "Io",
            Self::Other { .. } => "Other",
        }
    }

    /// Check if this error ends the run as a failure.
    ///
    /// Everything else is contained by the stage that produced it.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesFound { .. }
                | Self::MergeProducedEmptyOutput
                | Self::FailedToWrite { .. }
                | Self::ConfigNotFound { .. }
                | Self::InvalidConfig { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } => 2,
            Self::InvalidConfig { .. } => 1,
            Self::Io { .. } => 5,
            _ => 1,
        }
    }
}
