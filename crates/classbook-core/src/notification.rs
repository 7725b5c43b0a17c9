//! Notification port.
//!
//! Delivery (email, SMS, push) lives outside the core. Notifications are
//! best effort and strictly downstream of persistence.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;

/// A message addressed to a member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    /// Notification kind, e.g. `waitlist.promoted`.
    pub kind: &'static str,
    /// Member the notification is addressed to.
    pub recipient: Uuid,
    /// Kind-specific data.
    pub payload: serde_json::Value,
}

/// Outbound notification port.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hands a notification to the delivery channel.
    async fn send(&self, notification: Notification) -> Result<(), DomainError>;
}

/// Sends a notification and swallows any failure after logging it.
pub async fn notify_best_effort(notifier: &dyn Notifier, notification: Notification) {
    let kind = notification.kind;
    let recipient = notification.recipient;
    if let Err(err) = notifier.send(notification).await {
        tracing::warn!(kind, %recipient, error = %err, "notification delivery failed");
    }
}
