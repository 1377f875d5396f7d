//! Server-side reminder loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use smartcrm_service::ReminderService;

/// Spawns a task that runs one reminder pass every `interval`.
///
/// Errors are logged and the loop carries on with the next tick.
pub fn start_reminder_scheduler(reminders: Arc<ReminderService>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tracing::info!(interval_secs = interval.as_secs(), "Reminder scheduler started");
        loop {
            ticker.tick().await;
            match reminders.run_once(Utc::now()).await {
                Ok(sent) => tracing::debug!(sent, "Reminder pass finished"),
                Err(e) => tracing::warn!(error = %e, "Reminder pass failed"),
            }
        }
    });
}
