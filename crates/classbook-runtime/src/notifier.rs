//! Notifier that writes notifications to the trace log.

use async_trait::async_trait;
use classbook_core::error::DomainError;
use classbook_core::notification::{Notification, Notifier};
use tracing::info;

/// Logs each notification at `info` instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), DomainError> {
        info!(
            kind = notification.kind,
            recipient = %notification.recipient,
            payload = %notification.payload,
            "notification sent"
        );
        Ok(())
    }
}
