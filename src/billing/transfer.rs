//! Export, import and reset of the full data set
//!
//! The export document mirrors the persisted collections:
//!
//! ```json
//! { "invoices": [...], "payments": [...], "settings": {...} }
//! ```
//!
//! Import parses and checks the whole document before touching storage, so a
//! malformed file never clears existing data.

use crate::billing::payments::PaymentMethodService;
use crate::billing::service::InvoiceService;
use crate::billing::settings::SettingsService;
use crate::core::error::{BillingResult, FieldValidationError, StorageError, ValidationError};
use crate::core::invoice::{Invoice, round_cents};
use crate::core::payment::PaymentMethod;
use crate::core::settings::Settings;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportBundle {
    pub invoices: Vec<Invoice>,
    pub payments: Vec<PaymentMethod>,
    pub settings: Settings,
}

impl ExportBundle {
    /// Reject records the services could never have produced.
    ///
    /// Ids must be unique per collection, clients and names non-empty and
    /// amounts storable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for (i, invoice) in self.invoices.iter().enumerate() {
            if !seen.insert(invoice.id) {
                errors.push(FieldValidationError::new(
                    &format!("invoices[{i}].id"),
                    format!("duplicate id {}", invoice.id),
                ));
            }
            if invoice.client.trim().is_empty() {
                errors.push(FieldValidationError::new(
                    &format!("invoices[{i}].client"),
                    "is required",
                ));
            }
            let amount = invoice.amount;
            if !amount.is_finite() || amount < 0.0 || !round_cents(amount).is_finite() {
                errors.push(FieldValidationError::new(
                    &format!("invoices[{i}].amount"),
                    format!("must be a storable non-negative number (got {amount})"),
                ));
            }
        }

        let mut seen = HashSet::new();
        for (i, method) in self.payments.iter().enumerate() {
            if !seen.insert(method.id) {
                errors.push(FieldValidationError::new(
                    &format!("payments[{i}].id"),
                    format!("duplicate id {}", method.id),
                ));
            }
            if method.name.trim().is_empty() {
                errors.push(FieldValidationError::new(
                    &format!("payments[{i}].name"),
                    "is required",
                ));
            }
        }

        ValidationError::check(errors)
    }
}

pub struct DataTransfer {
    invoices: Arc<InvoiceService>,
    payments: Arc<PaymentMethodService>,
    settings: Arc<SettingsService>,
}

impl DataTransfer {
    pub fn new(
        invoices: Arc<InvoiceService>,
        payments: Arc<PaymentMethodService>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            invoices,
            payments,
            settings,
        }
    }

    pub async fn export(&self) -> BillingResult<ExportBundle> {
        Ok(ExportBundle {
            invoices: self.invoices.list().await?,
            payments: self.payments.list().await?,
            settings: self.settings.get().await?,
        })
    }

    /// Pretty-printed export document
    pub async fn export_json(&self) -> BillingResult<String> {
        let bundle = self.export().await?;
        serde_json::to_string_pretty(&bundle)
            .map_err(|e| StorageError::serialization("export", e).into())
    }

    /// Payment methods alone, as a pretty-printed JSON array
    pub async fn export_payments_json(&self) -> BillingResult<String> {
        let payments = self.payments.list().await?;
        serde_json::to_string_pretty(&payments)
            .map_err(|e| StorageError::serialization("export", e).into())
    }

    /// Overwrite every collection with the contents of an export document.
    ///
    /// Missing sections import as empty (or default settings).
    pub async fn import_json(&self, document: &str) -> BillingResult<ExportBundle> {
        let bundle: ExportBundle = serde_json::from_str(document).map_err(ValidationError::from)?;
        self.import(bundle.clone()).await?;
        Ok(bundle)
    }

    pub async fn import(&self, bundle: ExportBundle) -> BillingResult<()> {
        bundle.validate()?;
        let ExportBundle {
            invoices,
            payments,
            settings,
        } = bundle;
        let (invoice_count, payment_count) = (invoices.len(), payments.len());

        self.invoices.replace_all(invoices).await?;
        self.payments.replace_all(payments).await?;
        self.settings.replace(settings).await?;

        tracing::info!(
            invoices = invoice_count,
            payments = payment_count,
            "Imported billing data"
        );
        Ok(())
    }

    /// Remove all invoices and payment methods and restore default settings
    pub async fn reset(&self) -> BillingResult<()> {
        self.import(ExportBundle::default()).await?;
        tracing::info!("Billing data reset");
        Ok(())
    }
}
