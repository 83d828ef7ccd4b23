use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::config::EmailSettings;
use crate::mail::{MailError, MailReceipt, MailRelay};

/// SMTP relay backed by lettre's async transport.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpRelay {
    pub fn from_settings(settings: &EmailSettings) -> Result<Self, MailError> {
        if !settings.is_configured() {
            return Err(MailError::NotConfigured);
        }

        let host = settings.host.trim();
        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.trim().to_string(),
                settings.pass.clone(),
            ))
            .build();

        let from = settings
            .sender()
            .parse::<Address>()
            .map_err(|e| MailError::InvalidAddress(format!("{}: {}", settings.sender(), e)))?;

        debug!(host, port = settings.port, secure = settings.secure, "SMTP relay configured");

        Ok(Self {
            transport,
            from: Mailbox::new(Some("Meeting Notes Summarizer".to_string()), from),
        })
    }

    fn message_id(&self) -> String {
        format!("<{}@{}>", uuid::Uuid::new_v4(), self.from.email.domain())
    }
}

#[async_trait]
impl MailRelay for SmtpRelay {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        text: String,
        html: String,
    ) -> Result<MailReceipt, MailError> {
        let message_id = self.message_id();

        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject)
            .message_id(Some(message_id.clone()));

        for recipient in recipients {
            let address = recipient
                .parse::<Address>()
                .map_err(|_| MailError::InvalidAddress(recipient.clone()))?;
            builder = builder.to(Mailbox::new(None, address));
        }

        let message = builder
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        info!("Email sent to {} recipient(s): {}", recipients.len(), message_id);
        Ok(MailReceipt { message_id })
    }

    async fn verify(&self) -> Result<(), MailError> {
        let ok = self
            .transport
            .test_connection()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if ok {
            Ok(())
        } else {
            Err(MailError::Transport("SMTP server rejected the connection".to_string()))
        }
    }
}
