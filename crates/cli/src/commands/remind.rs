use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use smartcrm_core::AppConfig;
use smartcrm_service::{LogNotifier, Notifier, ReminderService, SmtpNotifier};

use crate::open_storage;

/// One reminder pass, for running from cron instead of the server loop.
pub(crate) async fn run() -> Result<()> {
    let config = AppConfig::from_env();
    let storage = open_storage(&config).await?;
    let notifier: Arc<dyn Notifier> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpNotifier::new(smtp)?),
        None => Arc::new(LogNotifier),
    };
    let reminders = ReminderService::new(storage, notifier, &config.reminders);
    let sent = reminders.run_once(Utc::now()).await?;
    println!("{sent} reminder(s) sent");
    Ok(())
}
