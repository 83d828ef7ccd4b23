//! Email sharing for precis
//!
//! A [`MailRelay`] delivers a summary to a list of recipients. The SMTP
//! implementation lives in [`smtp`]; message bodies are rendered by
//! [`format`].

pub mod format;
mod smtp;

use async_trait::async_trait;
use lettre::Address;
use thiserror::Error;

pub use smtp::SmtpRelay;

/// Failures from the mail relay.
#[derive(Error, Debug)]
pub enum MailError {
    #[error("Email service not configured. Set EMAIL_HOST, EMAIL_USER and EMAIL_PASS.")]
    NotConfigured,

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build email: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

impl MailError {
    /// Whether the relay is unusable until configuration changes.
    pub fn is_configuration(&self) -> bool {
        matches!(self, MailError::NotConfigured)
    }
}

/// Identifier of an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReceipt {
    pub message_id: String,
}

#[async_trait]
pub trait MailRelay: Send + Sync {
    /// Send `body` to every address in `recipients` under the given title.
    async fn send_summary(
        &self,
        recipients: &[String],
        body: &str,
        title: &str,
    ) -> Result<MailReceipt, MailError> {
        self.send(
            recipients,
            &format::summary_subject(title),
            format::summary_text(title, body),
            format::summary_html(title, body),
        )
        .await
    }

    /// Send a message with an explicit subject and both bodies.
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        text: String,
        html: String,
    ) -> Result<MailReceipt, MailError>;

    /// Check that the relay accepts connections and credentials.
    async fn verify(&self) -> Result<(), MailError>;
}

/// Recipient list split by validity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressCheck {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

/// Normalize an address: trimmed and lower-cased.
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Whether the normalized address parses as a mailbox address.
pub fn is_valid_address(address: &str) -> bool {
    normalize_address(address).parse::<Address>().is_ok()
}

/// Split recipients into valid (normalized) and invalid (as given).
pub fn validate_addresses<S: AsRef<str>>(recipients: &[S]) -> AddressCheck {
    let mut check = AddressCheck::default();

    for recipient in recipients {
        let raw = recipient.as_ref();
        let normalized = normalize_address(raw);
        if normalized.parse::<Address>().is_ok() {
            check.valid.push(normalized);
        } else {
            check.invalid.push(raw.to_string());
        }
    }

    check
}
