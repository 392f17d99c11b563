//! Shared test harness for billing integration tests
//!
//! Provides a settable clock, a recording notification sink and a fixture
//! that wires every service over one store.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod billing_harness;
//! use billing_harness::*;
//!
//! billing_store_tests!(Arc::new(InMemoryStore::new()));
//! ```

#![allow(dead_code)]

#[macro_use]
mod lifecycle_tests;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use mockable::Clock;
use smartbills::billing::{DataTransfer, InvoiceService, PaymentMethodService, SettingsService};
use smartbills::core::invoice::Invoice;
use smartbills::core::notify::NotificationSink;
use smartbills::core::store::BillingStore;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock pinned to a settable instant
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(rfc3339: &str) -> Arc<Self> {
        Arc::new(Self(Mutex::new(rfc3339.parse().expect("fixture timestamp"))))
    }

    pub fn set(&self, rfc3339: &str) {
        *self.0.lock().unwrap() = rfc3339.parse().expect("fixture timestamp");
    }

    pub fn advance_days(&self, days: i64) {
        *self.0.lock().unwrap() += TimeDelta::days(days);
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Notification sink
// ---------------------------------------------------------------------------

/// Records `(invoice id, client)` for every delivered notification
#[derive(Clone, Default)]
pub struct RecordingSink(Arc<Mutex<Vec<(Uuid, String)>>>);

impl RecordingSink {
    pub fn ids(&self) -> Vec<Uuid> {
        self.0.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn clients(&self) -> Vec<String> {
        self.0.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, invoice: &Invoice) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .push((invoice.id, invoice.client.clone()));
        Ok(())
    }
}

/// Sink that refuses every delivery
pub struct UnsupportedSink;

#[async_trait]
impl NotificationSink for UnsupportedSink {
    async fn notify(&self, _invoice: &Invoice) -> Result<()> {
        Err(anyhow!("notifications are not supported here"))
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// Every service wired over one store
pub struct Billing {
    pub invoices: Arc<InvoiceService>,
    pub payments: Arc<PaymentMethodService>,
    pub settings: Arc<SettingsService>,
    pub transfer: DataTransfer,
    pub clock: Arc<FixedClock>,
    pub sink: RecordingSink,
}

impl Billing {
    pub fn over<S: BillingStore + 'static>(store: Arc<S>, now: &str) -> Self {
        let clock = FixedClock::at(now);
        let sink = RecordingSink::default();

        let invoices = Arc::new(
            InvoiceService::new(store.clone(), clock.clone()).with_sink(Arc::new(sink.clone())),
        );
        let payments = Arc::new(PaymentMethodService::new(store.clone()));
        let settings = Arc::new(SettingsService::new(store));
        let transfer = DataTransfer::new(invoices.clone(), payments.clone(), settings.clone());

        Self {
            invoices,
            payments,
            settings,
            transfer,
            clock,
            sink,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn date(value: &str) -> NaiveDate {
    value.parse().expect("fixture date")
}

/// Position of an invoice in the stored order
pub fn position(invoices: &[Invoice], id: Uuid) -> Option<usize> {
    invoices.iter().position(|i| i.id == id)
}
