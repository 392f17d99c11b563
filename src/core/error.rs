//! Typed error handling for billing operations
//!
//! Every fallible operation in the crate returns a [`BillingError`] so callers
//! can match on the category instead of inspecting strings.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: bad input on create/edit/import
//! - [`BillingError::NotFound`]: operation on an unknown id
//! - [`StorageError`]: the persistence collaborator failed
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Example
//!
//! ```rust,ignore
//! match service.edit(id, input).await {
//!     Ok(invoice) => println!("Saved {}", invoice.id),
//!     Err(BillingError::NotFound { id, .. }) => println!("Invoice {} is gone", id),
//!     Err(BillingError::Validation(e)) => println!("Fix the form: {}", e),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for billing operations
#[derive(Debug, Error)]
pub enum BillingError {
    /// Input failed validation; nothing was mutated
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced record does not exist
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    /// The storage collaborator failed; previously persisted state is intact
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BillingError {
    /// Shorthand for a missing invoice
    pub fn invoice_not_found(id: Uuid) -> Self {
        BillingError::NotFound {
            entity_type: "invoice".to_string(),
            id,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BillingError::Validation(_) => "VALIDATION_ERROR",
            BillingError::NotFound { .. } => "NOT_FOUND",
            BillingError::Storage(_) => "STORAGE_ERROR",
            BillingError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the caller can recover by changing its input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BillingError::Validation(_) | BillingError::NotFound { .. }
        )
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Single field validation error
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Invalid JSON document (import)
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Turn a list of collected field errors into a result
    pub fn check(mut errors: Vec<FieldValidationError>) -> Result<(), ValidationError> {
        match errors.len() {
            0 => Ok(()),
            1 => {
                let FieldValidationError { field, message } = errors.remove(0);
                Err(ValidationError::FieldError { field, message })
            }
            _ => Err(ValidationError::FieldErrors(errors)),
        }
    }

    /// Names of the offending fields
    pub fn fields(&self) -> Vec<&str> {
        match self {
            ValidationError::FieldError { field, .. } => vec![field.as_str()],
            ValidationError::FieldErrors(errors) => {
                errors.iter().map(|e| e.field.as_str()).collect()
            }
            ValidationError::InvalidJson { .. } => Vec::new(),
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing medium failed
    #[error("{backend} I/O error: {message}")]
    Io { backend: String, message: String },

    /// Persisted data could not be encoded or decoded
    #[error("{backend} serialization error: {message}")]
    Serialization { backend: String, message: String },

    /// Lock poisoned or otherwise unusable
    #[error("Storage backend '{backend}' is unavailable: {message}")]
    Unavailable { backend: String, message: String },
}

impl StorageError {
    pub fn io(backend: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Io {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    pub fn serialization(backend: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Serialization {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }

    pub fn unavailable(backend: &str, err: impl std::fmt::Display) -> Self {
        StorageError::Unavailable {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse config{}: {message}", describe_file(.file))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn describe_file(file: &Option<String>) -> String {
    file.as_ref()
        .map(|f| format!(" file '{}'", f))
        .unwrap_or_default()
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::InvalidJson {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for billing operations
pub type BillingResult<T> = Result<T, BillingError>;
