//! Server-side follow-up reminders.
//!
//! Each pass picks pending follow-ups that are due within the alert window
//! and have not been notified, e-mails their owner and flags them notified.

mod notifier;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use smartcrm_core::{Contact, FollowUp, ReminderConfig};
use smartcrm_storage::StorageBackend;
use smartcrm_storage::traits::{ContactStore, FollowUpStore};

pub use self::notifier::{LogNotifier, Notifier, Reminder, SmtpNotifier};
use crate::ServiceError;

fn reminder_for(followup: &FollowUp, contact: &Contact) -> Reminder {
    let due = followup.follow_up_date.format("%Y-%m-%d %H:%M UTC");
    let mut body = format!(
        "Follow-up with {} ({}) at {} is due {due}.",
        contact.customer_label(),
        contact.shop_label(),
        contact.phone
    );
    if let Some(notes) = &followup.notes {
        body.push_str("\n\nNotes: ");
        body.push_str(notes);
    }
    Reminder {
        to: followup.user_email.clone(),
        subject: format!("Follow-up reminder: {}", contact.display_name()),
        body,
    }
}

pub struct ReminderService {
    storage: Arc<StorageBackend>,
    notifier: Arc<dyn Notifier>,
    window: Duration,
}

impl ReminderService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>, notifier: Arc<dyn Notifier>, config: &ReminderConfig) -> Self {
        Self { storage, notifier, window: Duration::minutes(config.window_minutes) }
    }

    /// One scheduler tick. Returns how many reminders went out. A failed
    /// delivery is logged and retried on a later pass.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<usize, ServiceError> {
        let due = self.storage.list_unnotified_due(now + self.window).await?;
        let mut sent = 0;
        for followup in due {
            let Some(contact) = self.storage.get_contact(&followup.contact_id).await? else {
                tracing::debug!(followup = %followup.id, "contact gone, reminder skipped");
                continue;
            };
            if let Err(e) = self.notifier.send(&reminder_for(&followup, &contact)).await {
                tracing::warn!(followup = %followup.id, error = %e, "reminder delivery failed");
                continue;
            }
            self.storage.mark_followup_notified(&followup.id).await?;
            sent += 1;
        }
        if sent > 0 {
            tracing::info!(sent, "follow-up reminders sent");
        }
        Ok(sent)
    }
}
