//! Email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport. Every message
//! is `multipart/alternative` (plain text + HTML); report emails wrap that in
//! `multipart/mixed` with the PDF attached. If `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and no mailer should be built.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use veille_core::notification::ComposedEmail;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),

    #[error("No recipients")]
    NoRecipients,
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

const DEFAULT_FROM_ADDRESS: &str = "veille@localhost";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable        | Required | Default            |
    /// |-----------------|----------|--------------------|
    /// | `SMTP_HOST`     | yes      |                    |
    /// | `SMTP_PORT`     | no       | `587`              |
    /// | `SMTP_FROM`     | no       | `veille@localhost` |
    /// | `SMTP_USER`     | no       |                    |
    /// | `SMTP_PASSWORD` | no       |                    |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// A file attached to an outgoing email.
#[derive(Debug, Clone)]
pub struct MailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MailAttachment {
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "application/pdf".to_string(),
            bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

pub struct EmailDelivery {
    config: EmailConfig,
}

impl EmailDelivery {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Assemble the MIME message without sending it.
    pub fn build_message(
        &self,
        recipients: &[String],
        email: &ComposedEmail,
        attachment: Option<&MailAttachment>,
    ) -> Result<Message, EmailError> {
        if recipients.is_empty() {
            return Err(EmailError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.config.from_address.parse::<Mailbox>()?)
            .subject(email.subject.clone());
        for recipient in recipients {
            builder = builder.to(recipient.parse::<Mailbox>()?);
        }

        let alternative =
            MultiPart::alternative_plain_html(email.text_body.clone(), email.html_body.clone());

        let body = match attachment {
            None => alternative,
            Some(file) => {
                let content_type = ContentType::parse(&file.content_type)
                    .map_err(|e| EmailError::Build(e.to_string()))?;
                MultiPart::mixed().multipart(alternative).singlepart(
                    Attachment::new(file.file_name.clone()).body(file.bytes.clone(), content_type),
                )
            }
        };

        builder
            .multipart(body)
            .map_err(|e| EmailError::Build(e.to_string()))
    }

    /// Send one message to all recipients.
    pub async fn send(
        &self,
        recipients: &[String],
        email: &ComposedEmail,
        attachment: Option<&MailAttachment>,
    ) -> Result<(), EmailError> {
        let message = self.build_message(recipients, email, attachment)?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(message).await?;

        tracing::info!(
            recipients = recipients.len(),
            subject = %email.subject,
            attachment = attachment.map(|a| a.file_name.as_str()),
            "Email sent",
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
