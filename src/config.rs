use anyhow::Context;
use time::macros::format_description;
use time::UtcOffset;

/// SMTP settings for the confirmation mailer.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub from: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Telegram Bot API settings for the operator channel.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: String,
    pub base_url: String,
    pub utc_offset: UtcOffset,
    pub smtp: Option<SmtpConfig>,
    pub telegram: Option<TelegramConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "guestlist.db".into());
        let base_url =
            std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:7272".into());

        let utc_offset = match std::env::var("UTC_OFFSET") {
            Ok(v) => UtcOffset::parse(
                &v,
                format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
            )
            .with_context(|| format!("invalid UTC_OFFSET value: {v}"))?,
            Err(_) => UtcOffset::UTC,
        };

        // SMTP and Telegram are optional so local runs need no secrets; the
        // service degrades to logging-only transports when they are unset.
        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(587),
                from: std::env::var("SMTP_FROM")
                    .context("SMTP_FROM is required when SMTP_HOST is set")?,
                username: std::env::var("SMTP_USERNAME").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            }),
            Err(_) => None,
        };

        let telegram = match std::env::var("TELEGRAM_BOT_TOKEN") {
            Ok(bot_token) => Some(TelegramConfig {
                bot_token,
                chat_id: std::env::var("TELEGRAM_CHAT_ID")
                    .context("TELEGRAM_CHAT_ID is required when TELEGRAM_BOT_TOKEN is set")?,
            }),
            Err(_) => None,
        };

        Ok(Self {
            database_path,
            base_url,
            utc_offset,
            smtp,
            telegram,
        })
    }
}
