//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the API state. Publishing is
//! synchronous and never blocks the request that triggered it.

use chrono::{DateTime, Utc};
use janconnect_core::roles::Role;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// AccountEvent
// ---------------------------------------------------------------------------

/// Who a notification goes to, captured at the moment of the event.
///
/// A rejected user's row is already gone when the notification is sent, so
/// everything the message needs travels with the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Agency display name (or id when the agency could not be resolved).
    pub agency: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountEvent {
    Approved {
        recipient: Recipient,
        at: DateTime<Utc>,
    },
    Rejected {
        recipient: Recipient,
        reason: Option<String>,
        at: DateTime<Utc>,
    },
}

impl AccountEvent {
    pub fn approved(recipient: Recipient) -> Self {
        AccountEvent::Approved {
            recipient,
            at: Utc::now(),
        }
    }

    /// A blank reason is treated as no reason.
    pub fn rejected(recipient: Recipient, reason: Option<String>) -> Self {
        AccountEvent::Rejected {
            recipient,
            reason: reason.filter(|r| !r.trim().is_empty()),
            at: Utc::now(),
        }
    }

    pub fn recipient(&self) -> &Recipient {
        match self {
            AccountEvent::Approved { recipient, .. } | AccountEvent::Rejected { recipient, .. } => {
                recipient
            }
        }
    }

    /// Dot-separated event name for logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Approved { .. } => "account.approved",
            AccountEvent::Rejected { .. } => "account.rejected",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<AccountEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: AccountEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("No notification subscribers, event dropped");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AccountEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn recipient() -> Recipient {
        Recipient {
            name: "Meera Iyer".to_string(),
            email: "meera@example.org".to_string(),
            role: Role::AgencyUser,
            agency: Some("Chennai Social Welfare Board".to_string()),
            state: None,
        }
    }

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(AccountEvent::approved(recipient()));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type(), "account.approved");
        assert_eq!(received.recipient().email, "meera@example.org");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        EventBus::default().publish(AccountEvent::approved(recipient()));
    }

    #[test]
    fn blank_rejection_reason_is_dropped() {
        let event = AccountEvent::rejected(recipient(), Some("   ".to_string()));
        assert!(matches!(event, AccountEvent::Rejected { reason: None, .. }));
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(AccountEvent::rejected(
            recipient(),
            Some("Invalid agency selected".to_string()),
        ))
        .unwrap();
        assert_eq!(json["type"], "rejected");
        assert_eq!(json["reason"], "Invalid agency selected");
    }
}
