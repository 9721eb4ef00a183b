//! Building the outgoing message.

use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

use crate::config::EmailConfig;
use crate::error::{PdfMailError, Result};

/// A file to attach: its display name and contents.
#[derive(Debug, Clone)]
pub struct AttachedFile {
    /// File name shown to the recipient.
    pub name: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e| PdfMailError::delivery_failed(format!("Invalid address {address:?}: {e}")))
}

/// Build a `multipart/mixed` message with a plain-text body and an optional
/// PDF attachment, addressed to every configured recipient.
///
/// # Errors
///
/// Returns [`PdfMailError::EmailDeliveryFailed`] if an address does not parse
/// or the message cannot be assembled.
pub fn build_message(email: &EmailConfig, attachment: Option<AttachedFile>) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mailbox(&email.sender_email)?)
        .subject(email.subject.clone());
    for recipient in &email.recipients {
        builder = builder.to(mailbox(recipient)?);
    }

    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(email.body.clone()));
    if let Some(file) = attachment {
        let pdf = ContentType::parse("application/pdf").map_err(PdfMailError::delivery_failed)?;
        parts = parts.singlepart(Attachment::new(file.name).body(file.bytes, pdf));
    }

    builder
        .multipart(parts)
        .map_err(PdfMailError::delivery_failed)
}
