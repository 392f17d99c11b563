//! Invoice record and the input it is built from

use crate::core::date::{self, RecurrenceKind};
use crate::core::error::{FieldValidationError, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single billing record.
///
/// `created_at`, `updated_at`, `paid_at` and `notified` are maintained by
/// [`InvoiceService`](crate::billing::InvoiceService), never by callers.
/// Field names serialize in camelCase to match the persisted document shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub client: String,
    #[serde(with = "cents")]
    pub amount: f64,
    pub due: NaiveDate,
    #[serde(default)]
    pub recurrence: RecurrenceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Set once an overdue notification has fired for this record
    #[serde(default)]
    pub notified: bool,
}

impl Invoice {
    /// Build a fresh unpaid invoice from validated input
    pub fn new(fields: InvoiceFields, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            client: fields.client,
            amount: fields.amount,
            due: fields.due,
            recurrence: fields.recurrence,
            notes: fields.notes,
            paid: false,
            paid_at: None,
            created_at: now,
            updated_at: None,
            notified: false,
        }
    }

    /// Overwrite the editable fields, leaving payment and notification state alone
    pub fn apply(&mut self, fields: InvoiceFields, now: DateTime<Utc>) {
        self.client = fields.client;
        self.amount = fields.amount;
        self.due = fields.due;
        self.recurrence = fields.recurrence;
        self.notes = fields.notes;
        self.updated_at = Some(now);
    }

    /// The record a recurring invoice spawns when paid.
    ///
    /// Due date is advanced from this invoice's own `due`, not from `now`.
    /// Returns `None` for non-recurring invoices.
    pub fn successor(&self, now: DateTime<Utc>) -> Option<Invoice> {
        if !self.recurrence.is_recurring() {
            return None;
        }

        Some(Invoice {
            id: Uuid::new_v4(),
            client: self.client.clone(),
            amount: self.amount,
            due: date::advance(self.due, self.recurrence),
            recurrence: self.recurrence,
            notes: self.notes.clone(),
            paid: false,
            paid_at: None,
            created_at: now,
            updated_at: None,
            notified: false,
        })
    }

    /// Unpaid and due on or before `today`
    pub fn is_due_or_overdue(&self, today: NaiveDate) -> bool {
        !self.paid && date::days_between(today, self.due) <= 0
    }

    /// Unpaid and due within `days` of `today` (overdue included)
    pub fn is_due_within(&self, today: NaiveDate, days: i64) -> bool {
        !self.paid && date::days_between(today, self.due) <= days
    }

    /// Case-insensitive match against client and notes
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.client.to_lowercase().contains(&term)
            || self
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&term))
    }
}

/// Round a monetary value to two decimal places
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Serialize amounts as numbers with two decimal digits of precision.
///
/// Non-finite amounts are refused in both directions; JSON would store them
/// as `null` and the document could no longer be read back.
mod cents {
    use super::round_cents;
    use serde::{Deserialize, Deserializer, Serializer, de, ser};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let rounded = round_cents(*value);
        if !rounded.is_finite() {
            return Err(ser::Error::custom(format!("amount {} is not a finite number", value)));
        }
        serializer.serialize_f64(rounded)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let rounded = round_cents(f64::deserialize(deserializer)?);
        if !rounded.is_finite() {
            return Err(de::Error::custom("amount is not a finite number"));
        }
        Ok(rounded)
    }
}

/// Caller-supplied fields for create and edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceInput {
    pub client: String,
    pub amount: f64,
    /// ISO calendar date (`YYYY-MM-DD`)
    pub due: String,
    #[serde(default)]
    pub recurrence: RecurrenceKind,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InvoiceInput {
    pub fn new(client: impl Into<String>, amount: f64, due: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            amount,
            due: due.into(),
            recurrence: RecurrenceKind::None,
            notes: None,
        }
    }

    pub fn with_recurrence(mut self, recurrence: RecurrenceKind) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Check every field and produce the normalized values.
    ///
    /// All failures are collected so a form can highlight each bad field.
    pub fn validate(&self) -> Result<InvoiceFields, ValidationError> {
        let mut errors = Vec::new();

        let client = self.client.trim();
        if client.is_empty() {
            errors.push(FieldValidationError::new("client", "is required"));
        }

        if !self.amount.is_finite() || self.amount < 0.0 {
            errors.push(FieldValidationError::new(
                "amount",
                format!("must be a non-negative number (got {})", self.amount),
            ));
        } else if !round_cents(self.amount).is_finite() {
            errors.push(FieldValidationError::new(
                "amount",
                format!("is too large to store in cents (got {})", self.amount),
            ));
        }

        // MIN never escapes: a parse failure is reported by check() below
        let due = date::parse_date(&self.due).unwrap_or_else(|| {
            errors.push(FieldValidationError::new(
                "due",
                format!("'{}' is not a YYYY-MM-DD date", self.due),
            ));
            NaiveDate::MIN
        });

        ValidationError::check(errors)?;

        Ok(InvoiceFields {
            client: client.to_string(),
            amount: round_cents(self.amount),
            due,
            recurrence: self.recurrence,
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }
}

/// Normalized, validated invoice fields
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceFields {
    pub client: String,
    pub amount: f64,
    pub due: NaiveDate,
    pub recurrence: RecurrenceKind,
    pub notes: Option<String>,
}
