//! Internal event system for billing observers
//!
//! The EventBus decouples lifecycle mutations and reminder scans from the
//! views that react to them (stats, reminder lists, notification bridges).
//! It uses `tokio::sync::broadcast`, so any number of observers can subscribe.
//!
//! # Architecture
//!
//! ```text
//! InvoiceService ─────┐
//!                     ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ stats view
//! ReminderScheduler ──┘                                               ──▶ reminder view
//! ```

use crate::core::invoice::Invoice;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events related to invoice lifecycle transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InvoiceEvent {
    /// An invoice was created
    Created { invoice: Invoice },
    /// Editable fields of an invoice were overwritten
    Updated { invoice: Invoice },
    /// An invoice transitioned to paid, possibly spawning a successor
    Paid {
        invoice_id: Uuid,
        successor_id: Option<Uuid>,
    },
    /// An invoice was removed
    Deleted { invoice_id: Uuid },
    /// An unpaid invoice became due; emitted once per invoice lifetime
    Overdue {
        invoice_id: Uuid,
        client: String,
        amount: f64,
        due: NaiveDate,
    },
}

/// Events emitted by the reminder scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ReminderEvent {
    /// A scan finished; observers should refresh their reminder and stats views
    Refreshed {
        newly_notified: Vec<Uuid>,
        upcoming: Vec<Uuid>,
    },
    /// A due-date reminder was handed to bus observers for display
    Delivered {
        invoice_id: Uuid,
        client: String,
        amount: f64,
        due: NaiveDate,
    },
}

/// Top-level event that wraps invoice and reminder events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillingEvent {
    Invoice(InvoiceEvent),
    Reminder(ReminderEvent),
}

impl BillingEvent {
    pub fn event_kind(&self) -> &str {
        match self {
            BillingEvent::Invoice(_) => "invoice",
            BillingEvent::Reminder(_) => "reminder",
        }
    }

    /// Get the invoice ID this event relates to (if applicable)
    pub fn invoice_id(&self) -> Option<Uuid> {
        match self {
            BillingEvent::Invoice(e) => match e {
                InvoiceEvent::Created { invoice } | InvoiceEvent::Updated { invoice } => {
                    Some(invoice.id)
                }
                InvoiceEvent::Paid { invoice_id, .. }
                | InvoiceEvent::Deleted { invoice_id }
                | InvoiceEvent::Overdue { invoice_id, .. } => Some(*invoice_id),
            },
            BillingEvent::Reminder(ReminderEvent::Delivered { invoice_id, .. }) => {
                Some(*invoice_id)
            }
            BillingEvent::Reminder(ReminderEvent::Refreshed { .. }) => None,
        }
    }

    pub fn action(&self) -> &str {
        match self {
            BillingEvent::Invoice(e) => match e {
                InvoiceEvent::Created { .. } => "created",
                InvoiceEvent::Updated { .. } => "updated",
                InvoiceEvent::Paid { .. } => "paid",
                InvoiceEvent::Deleted { .. } => "deleted",
                InvoiceEvent::Overdue { .. } => "overdue",
            },
            BillingEvent::Reminder(ReminderEvent::Refreshed { .. }) => "refreshed",
            BillingEvent::Reminder(ReminderEvent::Delivered { .. }) => "delivered",
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: BillingEvent,
}

impl EventEnvelope {
    pub fn new(event: BillingEvent, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone (Arc internally) and can be shared across tasks.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. With no subscribers the event is dropped.
    /// Returns the number of receivers that will receive the event.
    pub fn publish(&self, event: BillingEvent, timestamp: DateTime<Utc>) -> usize {
        let envelope = EventEnvelope::new(event, timestamp);
        self.sender.send(envelope).unwrap_or(0)
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
