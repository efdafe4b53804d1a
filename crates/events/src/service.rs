//! Background consumer turning account events into delivered messages.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::AccountEvent;
use crate::delivery::Notifier;
use crate::template::render;

/// Consumes [`AccountEvent`]s and delivers them through a [`Notifier`].
///
/// Delivery failures are logged at `warn` and otherwise ignored; they never
/// reach the request that published the event.
pub struct NotificationService {
    notifier: Arc<dyn Notifier>,
    client_url: String,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn Notifier>, client_url: impl Into<String>) -> Self {
        Self {
            notifier,
            client_url: client_url.into(),
        }
    }

    /// Run the delivery loop until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<AccountEvent>) {
        tracing::info!(channel = self.notifier.channel(), "Notification service started");
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification service lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification service shutting down");
                    break;
                }
            }
        }
    }

    /// Render and deliver a single event.
    pub async fn handle(&self, event: &AccountEvent) {
        let message = render(event, &self.client_url);
        if let Err(e) = self.notifier.deliver(&message).await {
            tracing::warn!(
                error = %e,
                event_type = event.event_type(),
                to = %message.to,
                channel = self.notifier.channel(),
                "Failed to deliver notification"
            );
        }
    }
}
