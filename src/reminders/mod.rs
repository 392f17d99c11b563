//! Periodic due-date reminders

pub mod scheduler;

pub use scheduler::{ReminderScheduler, SchedulerState};
