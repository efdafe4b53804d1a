//! Log-only delivery for environments without SMTP.

use async_trait::async_trait;

use super::{DeliveryError, Notifier};
use crate::template::RenderedMessage;

/// Writes each message to the tracing output instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDelivery;

#[async_trait]
impl Notifier for LogDelivery {
    fn channel(&self) -> &'static str {
        "log"
    }

    async fn deliver(&self, message: &RenderedMessage) -> Result<(), DeliveryError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.body,
            "Email notification (SMTP not configured)"
        );
        Ok(())
    }
}
