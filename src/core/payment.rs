//! Saved payment methods
//!
//! No lifecycle beyond create and delete.

use crate::core::error::{FieldValidationError, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: Uuid,
    pub name: String,
    pub last4: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

/// Caller-supplied fields for a new payment method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethodInput {
    pub name: String,
    pub last4: String,
    #[serde(default)]
    pub expiry: Option<String>,
}

impl PaymentMethodInput {
    pub fn new(name: impl Into<String>, last4: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last4: last4.into(),
            expiry: None,
        }
    }

    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Validate and build the stored record with a fresh id
    pub fn into_payment_method(self) -> Result<PaymentMethod, ValidationError> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldValidationError::new("name", "is required"));
        }

        let last4 = self.last4.trim();
        if last4.is_empty() || !last4.chars().all(|c| c.is_ascii_digit()) {
            errors.push(FieldValidationError::new(
                "last4",
                "must be a non-empty string of digits",
            ));
        }

        ValidationError::check(errors)?;

        Ok(PaymentMethod {
            id: Uuid::new_v4(),
            name: name.to_string(),
            last4: last4.to_string(),
            expiry: self
                .expiry
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string),
        })
    }
}
