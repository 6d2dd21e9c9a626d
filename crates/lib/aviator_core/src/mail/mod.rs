//! Outbound email transport.

pub mod brevo;
pub mod template;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

pub use brevo::BrevoMailer;

/// Mail transport errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message (status={status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("mail configuration error: {0}")]
    Config(String),
}

/// A single message to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl OutgoingEmail {
    /// The one-time-code email for `code`.
    pub fn otp(to: &str, code: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your code for aviator.".to_string(),
            text: format!("Your OTP is {code}"),
            html: template::render(template::OTP_TEMPLATE, &[("otp", code)]),
        }
    }
}

/// Delivers email out-of-band.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Development mailer: logs the recipient and subject, delivers nothing.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        info!(to = %email.to, subject = %email.subject, "mail delivery disabled, dropping message");
        Ok(())
    }
}

/// Keeps every sent message in memory.
#[derive(Debug, Default)]
pub struct OutboxMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages sent so far.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    /// Most recent message addressed to `to`.
    pub async fn last_to(&self, to: &str) -> Option<OutgoingEmail> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}
