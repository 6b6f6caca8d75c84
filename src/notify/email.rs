// src/notify/email.rs
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::format::{compose_email, EmailDraft};
use super::{Channel, NotificationBatch, Notifier};
use crate::config::EmailConfig;
use crate::error::DispatchError;

/// The SMTP session, behind a seam so tests can capture messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, msg: Message) -> Result<(), DispatchError>;
}

/// STARTTLS session against the configured relay, authenticated with the
/// sender's credentials.
pub struct SmtpMailer {
    host: String,
    port: u16,
    creds: Credentials,
}

impl SmtpMailer {
    pub fn from_config(cfg: &EmailConfig) -> Self {
        Self {
            host: cfg.smtp_host.clone(),
            port: cfg.smtp_port,
            creds: Credentials::new(cfg.email_from.clone(), cfg.password.clone()),
        }
    }
}

/// Map a failed SMTP exchange onto the dispatch errors. 534/535 are the relay
/// rejecting our credentials.
pub fn smtp_failure(code: Option<&str>, detail: String) -> DispatchError {
    match code {
        Some("534" | "535") => DispatchError::EmailAuthError(detail),
        _ => DispatchError::EmailTransport(detail),
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, msg: Message) -> Result<(), DispatchError> {
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)
            .map_err(|e| DispatchError::EmailTransport(e.to_string()))?
            .port(self.port)
            .credentials(self.creds.clone())
            .build();

        mailer.send(msg).await.map_err(|e| {
            let code = e.status().map(|c| c.to_string());
            smtp_failure(code.as_deref(), e.to_string())
        })?;
        Ok(())
    }
}

pub struct EmailNotifier<T: MailTransport> {
    cfg: EmailConfig,
    transport: T,
}

impl<T: MailTransport> EmailNotifier<T> {
    pub fn new(cfg: EmailConfig, transport: T) -> Self {
        Self { cfg, transport }
    }
}

fn parse_address(raw: &str) -> Result<lettre::Address, DispatchError> {
    raw.parse().map_err(|e: lettre::address::AddressError| DispatchError::InvalidAddress {
        address: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Turn a draft into a UTF-8 plain-text message.
pub fn build_message(draft: &EmailDraft) -> Result<Message, DispatchError> {
    let from = Mailbox::new(
        Some(draft.sender_name.clone()),
        parse_address(&draft.sender_address)?,
    );
    let to = Mailbox::new(None, parse_address(&draft.recipient)?);

    Message::builder()
        .from(from)
        .to(to)
        .subject(draft.subject.clone())
        .header(header::ContentType::TEXT_PLAIN)
        .body(draft.body.clone())
        .map_err(|e| DispatchError::EmailTransport(format!("build email: {e}")))
}

#[async_trait]
impl<T: MailTransport> Notifier for EmailNotifier<T> {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, batch: &NotificationBatch<'_>) -> Result<(), DispatchError> {
        let draft = compose_email(&self.cfg, batch.query, batch.location, batch.listings);
        tracing::debug!(subject = %draft.subject, to = %draft.recipient, "email composed");

        let msg = build_message(&draft)?;
        self.transport.deliver(msg).await
    }
}
