use std::sync::Arc;

use sqlx::SqlitePool;
use time::UtcOffset;

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db;
use crate::notify::email::SmtpMailer;
use crate::notify::telegram::TelegramNotifier;
use crate::notify::{DisabledMailer, DisabledNotifier, Mailer, Notifier};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_path).await?;

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => Arc::new(SmtpMailer::new(smtp)?),
            None => {
                tracing::warn!("SMTP is not configured; outbound email is disabled");
                Arc::new(DisabledMailer)
            }
        };

        let notifier: Arc<dyn Notifier> = match &config.telegram {
            Some(telegram) => Arc::new(TelegramNotifier::new(telegram)?),
            None => {
                tracing::warn!("Telegram is not configured; operator alerts are disabled");
                Arc::new(DisabledNotifier)
            }
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(config.utc_offset));

        Ok(Self {
            db,
            config,
            mailer,
            notifier,
            clock,
        })
    }

    /// State over the given pool with disabled transports and a UTC system
    /// clock. Tests swap pieces in through the `with_*` builders.
    pub fn fake(db: SqlitePool) -> Self {
        let config = Arc::new(AppConfig {
            database_path: ":memory:".into(),
            base_url: "http://test.local".into(),
            utc_offset: UtcOffset::UTC,
            smtp: None,
            telegram: None,
        });
        Self {
            db,
            config,
            mailer: Arc::new(DisabledMailer),
            notifier: Arc::new(DisabledNotifier),
            clock: Arc::new(SystemClock::new(UtcOffset::UTC)),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
