//! Invoice lifecycle engine
//!
//! `InvoiceService` owns every state transition an invoice can go through:
//!
//! ```text
//! create ──▶ unpaid ──mark_paid──▶ paid
//!              │                    └──(recurring)──▶ successor (new unpaid record)
//!              └──scan_overdue──▶ notified (once per lifetime)
//! ```
//!
//! Every mutation is a read-modify-write of the whole collection through the
//! [`InvoiceStore`]. A service-wide lock serializes those cycles so a
//! scheduler tick and a user action can never interleave and drop an update.

use crate::config::ReminderConfig;
use crate::core::date::{self, day_of};
use crate::core::error::{BillingError, BillingResult};
use crate::core::events::{BillingEvent, EventBus, InvoiceEvent};
use crate::core::invoice::{Invoice, InvoiceInput, round_cents};
use crate::core::notify::{LogSink, NotificationSink};
use crate::core::store::InvoiceStore;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Result of a mark-paid call
#[derive(Debug, Clone, PartialEq)]
pub struct PaidOutcome {
    /// The invoice as stored after the call
    pub invoice: Invoice,
    /// Successor spawned by this call, if any
    pub successor: Option<Invoice>,
    /// True when the invoice was already paid and nothing changed
    pub already_paid: bool,
}

/// Result of one overdue scan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Invoices flagged (and notified about) by this scan
    pub newly_notified: Vec<Invoice>,
    /// Unpaid invoices due within the look-ahead window, earliest first
    pub upcoming: Vec<Invoice>,
}

/// Dashboard totals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceStats {
    pub count: usize,
    pub paid_total: f64,
    pub outstanding_total: f64,
    /// Earliest-due unpaid invoice
    pub next_due: Option<Invoice>,
}

pub struct InvoiceService {
    store: Arc<dyn InvoiceStore>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn NotificationSink>,
    events: EventBus,
    reminders: ReminderConfig,
    write_lock: Mutex<()>,
}

impl InvoiceService {
    /// Create a service with a logging notification sink and default reminder settings
    pub fn new(store: Arc<dyn InvoiceStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            sink: Arc::new(LogSink),
            events: EventBus::default(),
            reminders: ReminderConfig::default(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_reminder_config(mut self, reminders: ReminderConfig) -> Self {
        self.reminders = reminders;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn reminder_config(&self) -> &ReminderConfig {
        &self.reminders
    }

    fn publish(&self, event: InvoiceEvent) {
        self.events
            .publish(BillingEvent::Invoice(event), self.clock.utc());
    }

    // =========================================================================
    // Lifecycle transitions
    // =========================================================================

    /// Validate input and prepend a new unpaid invoice
    pub async fn create(&self, input: InvoiceInput) -> BillingResult<Invoice> {
        let fields = input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut invoices = self.store.get_invoices().await?;

        let invoice = Invoice::new(fields, self.clock.utc());
        invoices.insert(0, invoice.clone());
        self.store.put_invoices(invoices).await?;

        tracing::info!(invoice_id = %invoice.id, client = %invoice.client, due = %invoice.due, "Invoice created");
        self.publish(InvoiceEvent::Created {
            invoice: invoice.clone(),
        });

        Ok(invoice)
    }

    /// Overwrite the editable fields of an existing invoice.
    ///
    /// `paid`, `paid_at` and `notified` are left untouched.
    pub async fn edit(&self, id: Uuid, input: InvoiceInput) -> BillingResult<Invoice> {
        let fields = input.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut invoices = self.store.get_invoices().await?;

        let invoice = invoices
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| BillingError::invoice_not_found(id))?;
        invoice.apply(fields, self.clock.utc());
        let updated = invoice.clone();

        self.store.put_invoices(invoices).await?;

        tracing::debug!(invoice_id = %id, "Invoice updated");
        self.publish(InvoiceEvent::Updated {
            invoice: updated.clone(),
        });

        Ok(updated)
    }

    /// Transition an invoice to paid.
    ///
    /// Idempotent: an already-paid invoice is returned unchanged, with no
    /// successor and its original `paid_at`. A recurring invoice spawns one
    /// successor, prepended ahead of the paid record.
    pub async fn mark_paid(&self, id: Uuid) -> BillingResult<PaidOutcome> {
        let _guard = self.write_lock.lock().await;
        let mut invoices = self.store.get_invoices().await?;

        let idx = invoices
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| BillingError::invoice_not_found(id))?;

        if invoices[idx].paid {
            tracing::debug!(invoice_id = %id, "Invoice already paid, nothing to do");
            return Ok(PaidOutcome {
                invoice: invoices[idx].clone(),
                successor: None,
                already_paid: true,
            });
        }

        let now = self.clock.utc();
        invoices[idx].paid = true;
        invoices[idx].paid_at = Some(now);
        let paid = invoices[idx].clone();

        let successor = paid.successor(now);
        if let Some(next) = &successor {
            invoices.insert(0, next.clone());
        }

        self.store.put_invoices(invoices).await?;

        tracing::info!(
            invoice_id = %id,
            successor_id = ?successor.as_ref().map(|s| s.id),
            "Invoice marked paid"
        );
        self.publish(InvoiceEvent::Paid {
            invoice_id: id,
            successor_id: successor.as_ref().map(|s| s.id),
        });
        if let Some(next) = &successor {
            self.publish(InvoiceEvent::Created {
                invoice: next.clone(),
            });
        }

        Ok(PaidOutcome {
            invoice: paid,
            successor,
            already_paid: false,
        })
    }

    /// Remove an invoice. Unknown ids are a silent no-op.
    ///
    /// Returns whether a record was removed.
    pub async fn delete(&self, id: Uuid) -> BillingResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut invoices = self.store.get_invoices().await?;

        let before = invoices.len();
        invoices.retain(|i| i.id != id);
        if invoices.len() == before {
            tracing::debug!(invoice_id = %id, "Delete of unknown invoice ignored");
            return Ok(false);
        }

        self.store.put_invoices(invoices).await?;

        tracing::info!(invoice_id = %id, "Invoice deleted");
        self.publish(InvoiceEvent::Deleted { invoice_id: id });

        Ok(true)
    }

    /// Flag newly due/overdue invoices and notify about each exactly once.
    ///
    /// The `notified` flags are persisted before any notification is
    /// delivered, so a failed write never produces a notification and a
    /// later scan never repeats one. Delivery failures are logged and
    /// swallowed.
    pub async fn scan_overdue(&self, now: DateTime<Utc>) -> BillingResult<ScanReport> {
        let today = day_of(now);

        let guard = self.write_lock.lock().await;
        let mut invoices = self.store.get_invoices().await?;

        let mut newly_notified = Vec::new();
        for invoice in invoices.iter_mut() {
            if invoice.is_due_or_overdue(today) && !invoice.notified {
                invoice.notified = true;
                newly_notified.push(invoice.clone());
            }
        }

        let upcoming = self.upcoming_in(&invoices, today);

        if !newly_notified.is_empty() {
            self.store.put_invoices(invoices).await?;
        }
        drop(guard);

        for invoice in &newly_notified {
            if let Err(error) = self.sink.notify(invoice).await {
                tracing::warn!(invoice_id = %invoice.id, error = %error, "Notification delivery failed");
            }
            self.publish(InvoiceEvent::Overdue {
                invoice_id: invoice.id,
                client: invoice.client.clone(),
                amount: invoice.amount,
                due: invoice.due,
            });
        }

        tracing::debug!(
            newly_notified = newly_notified.len(),
            upcoming = upcoming.len(),
            "Overdue scan complete"
        );

        Ok(ScanReport {
            newly_notified,
            upcoming,
        })
    }

    /// Replace the whole collection (import and reset)
    pub async fn replace_all(&self, invoices: Vec<Invoice>) -> BillingResult<()> {
        let _guard = self.write_lock.lock().await;
        let count = invoices.len();
        self.store.put_invoices(invoices).await?;
        tracing::info!(count, "Invoice collection replaced");
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub async fn get(&self, id: Uuid) -> BillingResult<Invoice> {
        self.store
            .get_invoices()
            .await?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or_else(|| BillingError::invoice_not_found(id))
    }

    /// All invoices in stored order (newest first)
    pub async fn list(&self) -> BillingResult<Vec<Invoice>> {
        Ok(self.store.get_invoices().await?)
    }

    /// Invoices whose client or notes contain `term`, optionally narrowed to
    /// clients containing `client_filter`. Empty filters match everything.
    pub async fn search(&self, term: &str, client_filter: &str) -> BillingResult<Vec<Invoice>> {
        let term = term.trim();
        let client_filter = client_filter.trim().to_lowercase();

        Ok(self
            .store
            .get_invoices()
            .await?
            .into_iter()
            .filter(|i| term.is_empty() || i.matches_term(term))
            .filter(|i| client_filter.is_empty() || i.client.to_lowercase().contains(&client_filter))
            .collect())
    }

    /// Unpaid invoices due within the look-ahead window, earliest first
    pub async fn upcoming(&self, now: DateTime<Utc>) -> BillingResult<Vec<Invoice>> {
        let invoices = self.store.get_invoices().await?;
        Ok(self.upcoming_in(&invoices, day_of(now)))
    }

    fn upcoming_in(&self, invoices: &[Invoice], today: NaiveDate) -> Vec<Invoice> {
        let mut upcoming: Vec<Invoice> = invoices
            .iter()
            .filter(|i| i.is_due_within(today, self.reminders.lookahead_days))
            .cloned()
            .collect();
        upcoming.sort_by_key(|i| i.due);
        upcoming
    }

    /// Whether an invoice should be highlighted as due soon
    pub fn is_due_soon(&self, invoice: &Invoice, today: NaiveDate) -> bool {
        invoice.is_due_within(today, self.reminders.due_soon_days)
    }

    pub async fn stats(&self) -> BillingResult<InvoiceStats> {
        let invoices = self.store.get_invoices().await?;

        let paid_total: f64 = invoices.iter().filter(|i| i.paid).map(|i| i.amount).sum();
        let outstanding_total: f64 = invoices.iter().filter(|i| !i.paid).map(|i| i.amount).sum();
        let next_due = invoices
            .iter()
            .filter(|i| !i.paid)
            .min_by_key(|i| i.due)
            .cloned();

        Ok(InvoiceStats {
            count: invoices.len(),
            paid_total: round_cents(paid_total),
            outstanding_total: round_cents(outstanding_total),
            next_due,
        })
    }

    /// Days from `now` until an invoice is due (negative when overdue)
    pub fn days_until_due(&self, invoice: &Invoice, now: DateTime<Utc>) -> i64 {
        date::days_between(day_of(now), invoice.due)
    }
}
