//! Configuration module for pdfmail.
//!
//! The configuration file is TOML with a `[paths]` and an `[email]` table.
//! Every key is optional; missing keys fall back to the defaults below.
//! This module handles:
//! - Parsing and defaulting
//! - Normalization of the recipient list
//! - Validation of folder paths, port, and discovery pattern

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::PdfMailError;

/// Default SMTP submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Name of the run log file inside the log folder.
pub const LOG_FILE_NAME: &str = "pdf_processor.log";

/// Folder layout used by a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder scanned for input PDFs.
    pub source_folder: PathBuf,
    /// Folder processed inputs are moved into.
    pub archive_folder: PathBuf,
    /// Folder merged outputs are written to.
    pub merged_folder: PathBuf,
    /// Folder holding the run log.
    pub log_folder: PathBuf,
    /// Glob matched against file names in the source folder.
    pub pattern: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_folder: PathBuf::from("incoming_pdfs"),
            archive_folder: PathBuf::from("archive"),
            merged_folder: PathBuf::from("merged_pdfs"),
            log_folder: PathBuf::from("logs"),
            pattern: "*.pdf".to_string(),
        }
    }
}

impl PathsConfig {
    /// All folders the run needs, in bootstrap order.
    pub fn folders(&self) -> [&Path; 4] {
        [
            self.source_folder.as_path(),
            self.archive_folder.as_path(),
            self.merged_folder.as_path(),
            self.log_folder.as_path(),
        ]
    }

    /// Path of the run log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_folder.join(LOG_FILE_NAME)
    }
}

/// Recipients as written in the file: either `"a@x, b@x"` or `["a@x", "b@x"]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipientList {
    Joined(String),
    List(Vec<String>),
}

fn deserialize_recipients<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = RecipientList::deserialize(deserializer)?;
    Ok(match raw {
        RecipientList::Joined(joined) => parse_recipients(&joined),
        RecipientList::List(list) => list
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Split a comma-separated recipient string, trimming and dropping blanks.
pub fn parse_recipients(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// SMTP and message settings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host. Empty disables email.
    pub smtp_server: String,
    /// SMTP port.
    pub smtp_port: u16,
    /// Timeout for each SMTP command, in seconds.
    pub smtp_timeout_secs: u64,
    /// Envelope and header sender. Empty disables email.
    pub sender_email: String,
    /// Password for SMTP AUTH; `None` or empty skips authentication.
    pub sender_password: Option<String>,
    /// Recipients, in configured order.
    #[serde(deserialize_with = "deserialize_recipients")]
    pub recipients: Vec<String>,
    /// Message subject.
    pub subject: String,
    /// Plain-text message body.
    pub body: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: String::new(),
            smtp_port: DEFAULT_SMTP_PORT,
            smtp_timeout_secs: 30,
            sender_email: String::new(),
            sender_password: None,
            recipients: Vec::new(),
            subject: "Daily Merged PDF".to_string(),
            body: "Please find attached the merged PDF.".to_string(),
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_timeout_secs", &self.smtp_timeout_secs)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &self.sender_password.as_ref().map(|_| "<redacted>"))
            .field("recipients", &self.recipients)
            .field("subject", &self.subject)
            .field("body", &self.body)
            .finish()
    }
}

impl EmailConfig {
    /// The password to authenticate with, if one was given.
    pub fn credential(&self) -> Option<&str> {
        self.sender_password
            .as_deref()
            .filter(|p| !p.is_empty())
    }

    /// Name the first setting that prevents sending, if any.
    pub fn missing_setting(&self) -> Option<&'static str> {
        if self.smtp_server.trim().is_empty() {
            Some("smtp_server")
        } else if self.sender_email.trim().is_empty() {
            Some("sender_email")
        } else if self.recipients.is_empty() {
            Some("recipients")
        } else {
            None
        }
    }
}

/// Complete configuration for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder layout.
    pub paths: PathsConfig,
    /// Email settings.
    pub email: EmailConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or has the wrong types.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config = toml::from_str(raw).context("Failed to parse configuration")?;
        Ok(config)
    }

    /// Load and validate configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`PdfMailError::ConfigNotFound`] if the file does not exist and
    /// [`PdfMailError::InvalidConfig`] if it cannot be parsed or validated.
    pub async fn load(path: &Path) -> crate::Result<Self> {
        if !tokio::fs::try_exists(path).await? {
            return Err(PdfMailError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml(&raw)
            .and_then(|config| config.validate().map(|()| config))
            .map_err(|e| PdfMailError::invalid_config(format!("{}: {e:#}", path.display())))?;

        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A folder path is empty
    /// - The SMTP port is zero
    /// - The discovery pattern is not a valid glob
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("source_folder", &self.paths.source_folder),
            ("archive_folder", &self.paths.archive_folder),
            ("merged_folder", &self.paths.merged_folder),
            ("log_folder", &self.paths.log_folder),
        ];
        for (key, path) in named {
            if path.as_os_str().is_empty() {
                bail!("{key} cannot be empty");
            }
        }

        // Inputs, archive, and output must not share a folder.
        let moved = &named[..3];
        for (i, (left, a)) in moved.iter().enumerate() {
            for (right, b) in &moved[i + 1..] {
                if normalized(a) == normalized(b) {
                    bail!("{left} and {right} must differ");
                }
            }
        }

        if self.email.smtp_port == 0 {
            bail!("smtp_port must be between 1 and 65535");
        }

        if self.email.smtp_timeout_secs == 0 {
            bail!("smtp_timeout_secs must be at least 1");
        }

        globset::Glob::new(&self.paths.pattern)
            .with_context(|| format!("Invalid pattern: {}", self.paths.pattern))?;

        Ok(())
    }
}

/// Lexically absolute form of `path`, with `.` and `..` folded away.
fn normalized(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
