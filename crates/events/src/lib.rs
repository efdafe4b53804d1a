//! JanConnect account notifications.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Handlers publish after their write commits.
//! - [`AccountEvent`]: approval and rejection of a pending registration.
//! - [`NotificationService`]: background task that renders each event and
//!   hands it to a [`Notifier`].
//! - [`delivery`]: the SMTP and log-only notifiers.

pub mod bus;
pub mod delivery;
pub mod service;
pub mod template;

pub use bus::{AccountEvent, EventBus, Recipient};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::log::LogDelivery;
pub use delivery::{DeliveryError, Notifier};
pub use service::NotificationService;
