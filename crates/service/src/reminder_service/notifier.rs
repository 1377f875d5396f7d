//! Outbound reminder delivery.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use smartcrm_core::SmtpConfig;

use crate::ServiceError;

/// One reminder e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, reminder: &Reminder) -> Result<(), ServiceError>;
}

/// SMTP delivery through `lettre`. The blocking transport runs on the
/// blocking pool.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: String,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self, ServiceError> {
        let transport = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => SmtpTransport::relay(&config.host)
                .map_err(|e| ServiceError::Notification(format!("SMTP relay error: {e}")))?
                .port(config.port)
                .credentials(Credentials::new(user.clone(), pass.clone()))
                .build(),
            _ => SmtpTransport::builder_dangerous(&config.host).port(config.port).build(),
        };
        Ok(Self { transport, from: config.from.clone() })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, reminder: &Reminder) -> Result<(), ServiceError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| ServiceError::Notification(format!("invalid from address: {e}")))?,
            )
            .to(reminder
                .to
                .parse()
                .map_err(|e| ServiceError::Notification(format!("invalid to address: {e}")))?)
            .subject(reminder.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(reminder.body.clone())
            .map_err(|e| ServiceError::Notification(format!("failed to build email: {e}")))?;

        let transport = self.transport.clone();
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await?
            .map_err(|e| ServiceError::Notification(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

/// Used when SMTP is not configured: logs the reminder instead of sending it.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, reminder: &Reminder) -> Result<(), ServiceError> {
        tracing::info!(to = %reminder.to, subject = %reminder.subject, "SMTP not configured, reminder not sent");
        Ok(())
    }
}
