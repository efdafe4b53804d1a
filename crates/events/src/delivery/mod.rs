//! Transports for rendered notifications.

use async_trait::async_trait;

use crate::template::RenderedMessage;

pub mod email;
pub mod log;

/// Error returned by a [`Notifier`].
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Email(#[from] email::EmailError),
}

/// A channel that can deliver a rendered message.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs.
    fn channel(&self) -> &'static str;

    async fn deliver(&self, message: &RenderedMessage) -> Result<(), DeliveryError>;
}
