//! # SmartBills
//!
//! Local-first billing records: invoices with optional recurrence, saved
//! payment methods, user settings and due-date reminders.
//!
//! ## Features
//!
//! - **Invoice lifecycle**: create, edit, mark paid, delete
//! - **Recurrence**: paying a daily/weekly/monthly invoice schedules its successor
//! - **Notify once**: each overdue invoice produces at most one notification
//! - **Reminder scheduler**: periodic scans on a tokio interval
//! - **Pluggable storage**: in-memory or JSON documents on disk
//! - **Export/import**: the whole dataset as one JSON bundle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use smartbills::prelude::*;
//!
//! let store = Arc::new(JsonFileStore::open("./smartbills-data").await?);
//! let service = InvoiceService::new(store, Arc::new(DefaultClock));
//!
//! let invoice = service
//!     .create(InvoiceInput::new("Acme", 100.0, "2024-06-01").with_recurrence(RecurrenceKind::Monthly))
//!     .await?;
//!
//! let outcome = service.mark_paid(invoice.id).await?;
//! assert_eq!(outcome.successor.unwrap().due.to_string(), "2024-07-01");
//! ```

pub mod billing;
pub mod config;
pub mod core;
pub mod reminders;
pub mod storage;


/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        date::RecurrenceKind,
        error::{BillingError, BillingResult, StorageError, ValidationError},
        events::{BillingEvent, EventBus, EventEnvelope, InvoiceEvent, ReminderEvent},
        invoice::{Invoice, InvoiceInput},
        notify::{EventBusSink, LogSink, NotificationSink, SettingsGatedSink},
        payment::{PaymentMethod, PaymentMethodInput},
        settings::{Settings, Theme},
        store::{BillingStore, InvoiceStore, PaymentMethodStore, SettingsStore},
    };

    // === Services ===
    pub use crate::billing::{
        DataTransfer, ExportBundle, InvoiceService, InvoiceStats, PaidOutcome,
        PaymentMethodService, ScanReport, SettingsService,
    };
    pub use crate::reminders::{ReminderScheduler, SchedulerState};

    // === Storage ===
    pub use crate::storage::{InMemoryStore, JsonFileStore};

    // === Config ===
    pub use crate::config::{BillingConfig, ReminderConfig};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use mockable::{Clock, DefaultClock};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
