use async_trait::async_trait;

use crate::error::NotifyError;

pub mod email;
pub mod telegram;

/// Outbound confirmation-email transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Out-of-band operator alert channel. Not user-facing.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Stand-in mailer for environments without SMTP credentials. Logs what
/// would have been sent and succeeds.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), NotifyError> {
        tracing::info!(to = %to, subject = %subject, "email transport disabled, skipping send");
        Ok(())
    }
}

/// Stand-in operator channel for environments without a Telegram bot.
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(text = %text, "operator channel disabled, skipping send");
        Ok(())
    }
}
