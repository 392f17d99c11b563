//! Notification delivery for overdue invoices
//!
//! Delivery is best-effort. [`InvoiceService`](crate::billing::InvoiceService)
//! logs and swallows any error a sink returns, so a missing notification
//! capability never interrupts an overdue scan.

use crate::core::events::{BillingEvent, EventBus, ReminderEvent};
use crate::core::invoice::Invoice;
use crate::core::store::SettingsStore;
use anyhow::Result;
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;

/// Receives one call per invoice that became due or overdue
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, invoice: &Invoice) -> Result<()>;
}

/// Sink that writes reminders to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, invoice: &Invoice) -> Result<()> {
        tracing::info!(
            invoice_id = %invoice.id,
            due = %invoice.due,
            "Invoice due: {} (${:.2} is due)",
            invoice.client,
            invoice.amount
        );
        Ok(())
    }
}

/// Sink that hands reminders to event bus observers (UI toasts, bridges)
///
/// Publishes `ReminderEvent::Delivered`. With no subscribers the reminder
/// is dropped, which still counts as delivered.
#[derive(Clone)]
pub struct EventBusSink {
    events: EventBus,
    clock: Arc<dyn Clock>,
}

impl EventBusSink {
    pub fn new(events: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }
}

#[async_trait]
impl NotificationSink for EventBusSink {
    async fn notify(&self, invoice: &Invoice) -> Result<()> {
        let receivers = self.events.publish(
            BillingEvent::Reminder(ReminderEvent::Delivered {
                invoice_id: invoice.id,
                client: invoice.client.clone(),
                amount: invoice.amount,
                due: invoice.due,
            }),
            self.clock.utc(),
        );
        tracing::debug!(invoice_id = %invoice.id, receivers, "Reminder published");
        Ok(())
    }
}

/// Forwards to an inner sink only while notifications are enabled in settings
pub struct SettingsGatedSink<N, S: ?Sized> {
    inner: N,
    settings: Arc<S>,
}

impl<N, S: ?Sized> SettingsGatedSink<N, S> {
    pub fn new(inner: N, settings: Arc<S>) -> Self {
        Self { inner, settings }
    }
}

#[async_trait]
impl<N, S> NotificationSink for SettingsGatedSink<N, S>
where
    N: NotificationSink,
    S: SettingsStore + ?Sized,
{
    async fn notify(&self, invoice: &Invoice) -> Result<()> {
        if !self.settings.get_settings().await?.notifications_enabled {
            tracing::debug!(invoice_id = %invoice.id, "Notifications disabled, skipping delivery");
            return Ok(());
        }
        self.inner.notify(invoice).await
    }
}
