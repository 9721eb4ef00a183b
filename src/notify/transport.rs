//! SMTP delivery.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::EmailConfig;
use crate::error::{PdfMailError, Result};

/// Delivers one finished message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send `message` using the connection settings in `email`.
    async fn send(&self, email: &EmailConfig, message: Message) -> Result<()>;
}

/// Sends over SMTP with a STARTTLS upgrade.
///
/// A connection is opened per call and closed when the call returns; no pool
/// is kept between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmtpMailer;

impl SmtpMailer {
    fn transport(email: &EmailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email.smtp_server)
            .map_err(PdfMailError::delivery_failed)?
            .port(email.smtp_port)
            .timeout(Some(Duration::from_secs(email.smtp_timeout_secs)));

        if let Some(password) = email.credential() {
            builder = builder.credentials(Credentials::new(
                email.sender_email.clone(),
                password.to_string(),
            ));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, email: &EmailConfig, message: Message) -> Result<()> {
        let transport = Self::transport(email)?;
        transport
            .send(message)
            .await
            .map_err(PdfMailError::delivery_failed)?;
        Ok(())
    }
}
