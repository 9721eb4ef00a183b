//! Email notification.
//!
//! Mails the merged PDF to the configured recipients. Nothing in here can
//! fail a run: incomplete settings and delivery errors come back as an
//! [`EmailOutcome`] and are logged, never propagated.

pub mod message;
pub mod transport;

pub use message::{AttachedFile, build_message};
pub use transport::{MailTransport, SmtpMailer};

use serde::Serialize;

use crate::config::EmailConfig;
use crate::context::RunContext;
use crate::error::PdfMailError;
use crate::merge::MergedOutput;

/// What happened to the notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmailOutcome {
    /// Delivered to every recipient in one transaction.
    Sent {
        /// Number of recipients.
        recipients: usize,
    },
    /// Not attempted because the settings are incomplete.
    Skipped {
        /// Which setting is missing.
        reason: String,
    },
    /// Attempted and failed.
    Failed {
        /// Error message.
        reason: String,
    },
    /// Not attempted in dry-run mode.
    DryRun,
}

impl EmailOutcome {
    /// Whether the message went out.
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Sends the merged output through a [`MailTransport`].
pub struct Notifier<'t> {
    transport: &'t dyn MailTransport,
}

impl<'t> Notifier<'t> {
    /// Create a notifier on top of `transport`.
    pub fn new(transport: &'t dyn MailTransport) -> Self {
        Self { transport }
    }

    /// Mail `output` (if any) according to `email`.
    pub async fn notify(
        &self,
        output: Option<&MergedOutput>,
        email: &EmailConfig,
        ctx: &RunContext<'_>,
    ) -> EmailOutcome {
        if let Some(missing) = email.missing_setting() {
            let err = PdfMailError::email_incomplete(missing);
            ctx.log.warn(&format!("{}: {err}", err.kind()));
            return EmailOutcome::Skipped {
                reason: err.to_string(),
            };
        }

        let attachment = match output {
            Some(output) => self.read_attachment(output, ctx).await,
            None => None,
        };

        let sent = match build_message(email, attachment) {
            Ok(message) => self.transport.send(email, message).await,
            Err(err) => Err(err),
        };

        match sent {
            Ok(()) => {
                let recipients = email.recipients.len();
                ctx.log
                    .info(&format!("Email sent to {recipients} recipients"));
                EmailOutcome::Sent { recipients }
            }
            Err(err) => {
                let err = match err {
                    err @ PdfMailError::EmailDeliveryFailed { .. } => err,
                    other => PdfMailError::delivery_failed(other),
                };
                ctx.log.error(&format!("{}: {err}", err.kind()));
                EmailOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn read_attachment(
        &self,
        output: &MergedOutput,
        ctx: &RunContext<'_>,
    ) -> Option<AttachedFile> {
        match tokio::fs::read(&output.path).await {
            Ok(bytes) => Some(AttachedFile {
                name: output.file_name(),
                bytes,
            }),
            Err(err) => {
                ctx.log.warn(&format!(
                    "Sending without attachment, cannot read {}: {err}",
                    output.path.display()
                ));
                None
            }
        }
    }
}
