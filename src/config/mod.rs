//! Configuration loading and management

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Reminder scan settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Seconds between scheduler ticks
    pub check_interval_secs: u64,

    /// Unpaid invoices due within this many days are listed as upcoming
    pub lookahead_days: i64,

    /// Unpaid invoices due within this many days are flagged "due soon"
    pub due_soon_days: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 60,
            lookahead_days: 7,
            due_soon_days: 3,
        }
    }
}

impl ReminderConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

/// Complete configuration for the billing service and reminder daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,

    pub reminders: ReminderConfig,

    /// Buffer size for the event bus broadcast channel
    pub event_bus_capacity: usize,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./smartbills-data"),
            reminders: ReminderConfig::default(),
            event_bus_capacity: 1024,
        }
    }
}

impl BillingConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the scheduler cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reminders.check_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reminders.check_interval_secs".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.reminders.lookahead_days < 0 {
            return Err(ConfigError::InvalidValue {
                field: "reminders.lookahead_days".to_string(),
                value: self.reminders.lookahead_days.to_string(),
                message: "must not be negative".to_string(),
            });
        }

        if self.event_bus_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "event_bus_capacity".to_string(),
                value: "0".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
