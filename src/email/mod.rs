pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{Config, SmtpConfig};

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    /// Display name shown next to the configured sender address.
    pub from_name: Option<String>,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Sends a message. Success means the transport accepted it, nothing more.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), String>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), String> {
        let message = build_message(&self.from, email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

fn build_message(from: &str, email: OutgoingEmail) -> Result<Message, String> {
    let from_addr: Address = from
        .parse()
        .map_err(|e| format!("Invalid from address: {e}"))?;
    let mut builder = Message::builder()
        .from(Mailbox::new(email.from_name, from_addr))
        .to(email
            .to
            .parse()
            .map_err(|e| format!("Invalid to address: {e}"))?)
        .subject(email.subject);

    if let Some(reply_to) = email.reply_to {
        builder = builder.reply_to(
            reply_to
                .parse()
                .map_err(|e| format!("Invalid reply-to address: {e}"))?,
        );
    }

    builder
        .multipart(MultiPart::alternative_plain_html(email.text, email.html))
        .map_err(|e| format!("Failed to build email: {e}"))
}

/// Stand-in used when SMTP is not configured: logs the message instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), String> {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email not sent:\n{}",
            email.text
        );
        Ok(())
    }
}

/// SMTP when configured and buildable, otherwise the logging stand-in.
pub fn mailer_from_config(config: &Config) -> Arc<dyn Mailer> {
    match config.smtp.as_ref().map(SmtpMailer::new) {
        Some(Ok(mailer)) => {
            tracing::info!("SMTP configured");
            Arc::new(mailer)
        }
        Some(Err(e)) => {
            tracing::warn!("SMTP not available: {e}");
            Arc::new(LogMailer)
        }
        None => {
            tracing::warn!("SMTP not configured, emails will be logged");
            Arc::new(LogMailer)
        }
    }
}
