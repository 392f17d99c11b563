//! In-memory store for testing and development

use crate::core::error::StorageError;
use crate::core::invoice::Invoice;
use crate::core::payment::PaymentMethod;
use crate::core::settings::Settings;
use crate::core::store::{InvoiceStore, PaymentMethodStore, SettingsStore};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

const BACKEND: &str = "in_memory";

/// In-memory implementation of every store trait
///
/// Uses RwLock for thread-safe access. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    invoices: Arc<RwLock<Vec<Invoice>>>,
    payment_methods: Arc<RwLock<Vec<PaymentMethod>>>,
    settings: Arc<RwLock<Settings>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with invoices
    pub fn with_invoices(invoices: Vec<Invoice>) -> Self {
        Self {
            invoices: Arc::new(RwLock::new(invoices)),
            ..Self::default()
        }
    }
}

fn read<T: Clone>(lock: &RwLock<T>) -> Result<T, StorageError> {
    lock.read()
        .map(|guard| guard.clone())
        .map_err(|e| StorageError::unavailable(BACKEND, format!("Failed to acquire read lock: {}", e)))
}

fn replace<T>(lock: &RwLock<T>, value: T) -> Result<(), StorageError> {
    let mut guard = lock
        .write()
        .map_err(|e| StorageError::unavailable(BACKEND, format!("Failed to acquire write lock: {}", e)))?;
    *guard = value;
    Ok(())
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn get_invoices(&self) -> Result<Vec<Invoice>, StorageError> {
        read(&self.invoices)
    }

    async fn put_invoices(&self, invoices: Vec<Invoice>) -> Result<(), StorageError> {
        replace(&self.invoices, invoices)
    }
}

#[async_trait]
impl PaymentMethodStore for InMemoryStore {
    async fn get_payment_methods(&self) -> Result<Vec<PaymentMethod>, StorageError> {
        read(&self.payment_methods)
    }

    async fn put_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<(), StorageError> {
        replace(&self.payment_methods, methods)
    }
}

#[async_trait]
impl SettingsStore for InMemoryStore {
    async fn get_settings(&self) -> Result<Settings, StorageError> {
        read(&self.settings)
    }

    async fn put_settings(&self, settings: Settings) -> Result<(), StorageError> {
        replace(&self.settings, settings)
    }
}
