use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Mail API returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub mime_type: String,
}

impl EmailMessage {
    pub fn plain(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: config::config().mail.from_address.clone(),
            subject: subject.into(),
            body: body.into(),
            mime_type: "text/plain".to_string(),
        }
    }
}

/// Outbound notification seam. Swapped for a recording fake in tests.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

pub struct MailService {
    client: reqwest::Client,
}

impl MailService {
    pub fn new() -> Self {
        Self { client: reqwest::Client::new() }
    }
}

impl Default for MailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationSender for MailService {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let settings = &config::config().mail;
        if !settings.enabled {
            debug!(to = %message.to, subject = %message.subject, "Mail disabled, dropping message");
            return Ok(());
        }
        let response = self.client.post(&settings.api_url).json(message).send().await?;
        if !response.status().is_success() {
            return Err(MailError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

pub static MAILER: Lazy<MailService> = Lazy::new(MailService::new);

/// Deliver a notification without letting a mail failure propagate into
/// the operation that triggered it.
pub async fn send_best_effort(sender: &dyn NotificationSender, message: EmailMessage) {
    if let Err(err) = sender.send(&message).await {
        warn!(to = %message.to, subject = %message.subject, error = %err, "Failed to send notification");
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records messages instead of sending them.
    #[derive(Default)]
    pub struct RecordingSender {
        pub sent: Mutex<Vec<EmailMessage>>,
        pub fail: bool,
    }

    #[async_trait]
    impl NotificationSender for RecordingSender {
        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Status(500));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSender;
    use super::*;

    #[tokio::test]
    async fn best_effort_swallows_failures() {
        let sender = RecordingSender { fail: true, ..Default::default() };
        send_best_effort(&sender, EmailMessage::plain("a@x.com", "s", "b")).await;
    }

    #[tokio::test]
    async fn best_effort_delivers_when_healthy() {
        let sender = RecordingSender::default();
        send_best_effort(&sender, EmailMessage::plain("a@x.com", "Device ready", "hi")).await;
        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Device ready");
    }
}
