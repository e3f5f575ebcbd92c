use std::time::Duration;

use async_trait::async_trait;

use crate::config::TelegramConfig;
use crate::error::NotifyError;
use crate::notify::Notifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operator alerts via the Telegram Bot API `sendMessage` call.
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(cfg: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            bot_token: cfg.bot_token.clone(),
            chat_id: cfg.chat_id.clone(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.send_message_url())
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_message_url_embeds_bot_token() {
        let notifier = TelegramNotifier::new(&TelegramConfig {
            bot_token: "12345:abcdef".to_string(),
            chat_id: "-100200300".to_string(),
        })
        .unwrap();
        assert_eq!(
            notifier.send_message_url(),
            "https://api.telegram.org/bot12345:abcdef/sendMessage"
        );
    }
}
