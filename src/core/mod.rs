//! Core module containing the billing domain types and the traits the
//! services are written against

pub mod date;
pub mod error;
pub mod events;
pub mod invoice;
pub mod notify;
pub mod payment;
pub mod settings;
pub mod store;

pub use date::RecurrenceKind;
pub use error::{BillingError, BillingResult, ConfigError, StorageError, ValidationError};
pub use events::{BillingEvent, EventBus, EventEnvelope, InvoiceEvent, ReminderEvent};
pub use invoice::{Invoice, InvoiceFields, InvoiceInput};
pub use notify::{EventBusSink, LogSink, NotificationSink, SettingsGatedSink};
pub use payment::{PaymentMethod, PaymentMethodInput};
pub use settings::{Settings, Theme};
pub use store::{BillingStore, InvoiceStore, PaymentMethodStore, SettingsStore};
