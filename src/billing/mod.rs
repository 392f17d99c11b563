//! Billing services built on the store traits

pub mod payments;
pub mod service;
pub mod settings;
pub mod transfer;

pub use payments::PaymentMethodService;
pub use service::{InvoiceService, InvoiceStats, PaidOutcome, ScanReport};
pub use settings::SettingsService;
pub use transfer::{DataTransfer, ExportBundle};
