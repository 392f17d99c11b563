//! Persistence collaborator traits
//!
//! Each store reads and replaces a whole collection at once. Implementations
//! must either persist the full collection or leave the previous one intact,
//! never a partial write.

use crate::core::error::StorageError;
use crate::core::invoice::Invoice;
use crate::core::payment::PaymentMethod;
use crate::core::settings::Settings;
use async_trait::async_trait;

/// Ordered invoice collection
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Fetch the full collection in stored order
    async fn get_invoices(&self) -> Result<Vec<Invoice>, StorageError>;

    /// Replace the full collection. Every field, `notified` included, must round-trip.
    async fn put_invoices(&self, invoices: Vec<Invoice>) -> Result<(), StorageError>;
}

/// Ordered payment method collection
#[async_trait]
pub trait PaymentMethodStore: Send + Sync {
    async fn get_payment_methods(&self) -> Result<Vec<PaymentMethod>, StorageError>;

    async fn put_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<(), StorageError>;
}

/// User settings document
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Stored settings, or defaults when none were saved yet
    async fn get_settings(&self) -> Result<Settings, StorageError>;

    async fn put_settings(&self, settings: Settings) -> Result<(), StorageError>;
}

/// A backend that holds every collection
pub trait BillingStore: InvoiceStore + PaymentMethodStore + SettingsStore {}

impl<T: InvoiceStore + PaymentMethodStore + SettingsStore> BillingStore for T {}
