//! Outbound email. Only password-reset messages are sent today.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("mail webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("mail webhook rejected message with status {0}")]
    Rejected(u16),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailerError>;
}

/// POSTs each message as JSON to a delivery webhook.
pub struct WebhookMailer {
    client: reqwest::Client,
    url: String,
}

impl WebhookMailer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, MailerError> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        let response = self.client.post(&self.url).json(&email).send().await?;

        if !response.status().is_success() {
            return Err(MailerError::Rejected(response.status().as_u16()));
        }

        tracing::info!("Sent '{}' email", email.subject);
        Ok(())
    }
}

/// Development fallback: the message only goes to the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailerError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Email not delivered (no webhook configured):\n{}", email.text);
        Ok(())
    }
}

pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailerError> {
    Ok(match &config.webhook_url {
        Some(url) => Arc::new(WebhookMailer::new(url.clone(), Duration::from_secs(config.timeout_secs))?),
        None => Arc::new(LogMailer),
    })
}

pub fn password_reset_email(from: &str, to: &str, reset_link: &str, ttl_minutes: i64) -> Email {
    Email {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Reset your password".to_string(),
        text: format!(
            "Someone asked to reset the password for this account.\n\n\
             Follow this link to choose a new one (valid for {ttl_minutes} minutes):\n{reset_link}\n\n\
             If this wasn't you, you can ignore this email."
        ),
    }
}
