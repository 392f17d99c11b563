//! Payment method bookkeeping

use crate::core::error::BillingResult;
use crate::core::payment::{PaymentMethod, PaymentMethodInput};
use crate::core::store::PaymentMethodStore;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

pub struct PaymentMethodService {
    store: Arc<dyn PaymentMethodStore>,
    write_lock: Mutex<()>,
}

impl PaymentMethodService {
    pub fn new(store: Arc<dyn PaymentMethodStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Validate and prepend a new payment method
    pub async fn create(&self, input: PaymentMethodInput) -> BillingResult<PaymentMethod> {
        let method = input.into_payment_method()?;

        let _guard = self.write_lock.lock().await;
        let mut methods = self.store.get_payment_methods().await?;
        methods.insert(0, method.clone());
        self.store.put_payment_methods(methods).await?;

        tracing::info!(payment_method_id = %method.id, last4 = %method.last4, "Payment method added");
        Ok(method)
    }

    pub async fn list(&self) -> BillingResult<Vec<PaymentMethod>> {
        Ok(self.store.get_payment_methods().await?)
    }

    /// Remove a payment method; unknown ids are ignored
    pub async fn delete(&self, id: Uuid) -> BillingResult<bool> {
        let _guard = self.write_lock.lock().await;
        let mut methods = self.store.get_payment_methods().await?;

        let before = methods.len();
        methods.retain(|m| m.id != id);
        if methods.len() == before {
            return Ok(false);
        }

        self.store.put_payment_methods(methods).await?;
        tracing::info!(payment_method_id = %id, "Payment method deleted");
        Ok(true)
    }

    /// Replace the whole collection (import and reset)
    pub async fn replace_all(&self, methods: Vec<PaymentMethod>) -> BillingResult<()> {
        let _guard = self.write_lock.lock().await;
        self.store.put_payment_methods(methods).await?;
        Ok(())
    }
}
