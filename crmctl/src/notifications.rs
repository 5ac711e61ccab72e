//! Fire-and-forget notices sent after CRM mutations commit.
//!
//! The access engine builds a [`Notification`] and hands it to a [`Notifier`].
//! Delivery happens off the request path and a failed send is only logged: the
//! mutation that caused it has already been persisted and is never undone.

use std::sync::Arc;

use crate::config::Config;
use crate::email::EmailService;

/// One outgoing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub recipients: Vec<String>,
}

impl Notification {
    pub fn new(subject: impl Into<String>, body: impl Into<String>, from: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            from: from.into(),
            recipients,
        }
    }
}

/// Accepts notices for delivery. Must not block and must not fail the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Delivers notices as email on a spawned task.
#[derive(Clone)]
pub struct EmailNotifier {
    email: Arc<EmailService>,
}

impl EmailNotifier {
    pub fn new(email: EmailService) -> Self {
        Self { email: Arc::new(email) }
    }
}

impl Notifier for EmailNotifier {
    fn notify(&self, notification: Notification) {
        let email = self.email.clone();
        tokio::spawn(async move {
            match email
                .send(
                    &notification.from,
                    &notification.recipients,
                    &notification.subject,
                    &notification.body,
                )
                .await
            {
                Ok(()) => tracing::debug!(subject = %notification.subject, recipients = notification.recipients.len(), "Notification sent"),
                Err(e) => tracing::warn!(subject = %notification.subject, error = %e, "Failed to send notification"),
            }
        });
    }
}

/// Drops every notice. Used when `notifications.enabled` is off.
pub struct DisabledNotifier;

impl Notifier for DisabledNotifier {
    fn notify(&self, notification: Notification) {
        tracing::trace!(subject = %notification.subject, "Notifications disabled, dropping");
    }
}

/// The notifier for this configuration: email delivery, or [`DisabledNotifier`]
/// when `notifications.enabled` is off. This is the only place the flag is read.
pub fn notifier_for(config: &Config) -> anyhow::Result<Arc<dyn Notifier>> {
    if !config.notifications.enabled {
        return Ok(Arc::new(DisabledNotifier));
    }
    Ok(Arc::new(EmailNotifier::new(EmailService::new(config)?)))
}
