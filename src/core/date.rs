//! Calendar arithmetic for due dates and recurrence
//!
//! Pure functions, no state. Dates are `NaiveDate` (no time component), so
//! day differences are exact and never suffer from clock-time drift.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How often an invoice repeats once paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RecurrenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::None => "none",
            RecurrenceKind::Daily => "daily",
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::Monthly => "monthly",
        }
    }

    /// Whether paying an invoice with this recurrence spawns a successor
    pub fn is_recurring(&self) -> bool {
        !matches!(self, RecurrenceKind::None)
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(RecurrenceKind::None),
            "daily" => Ok(RecurrenceKind::Daily),
            "weekly" => Ok(RecurrenceKind::Weekly),
            "monthly" => Ok(RecurrenceKind::Monthly),
            other => Err(format!("unknown recurrence '{}'", other)),
        }
    }
}

/// Whole days from `a` to `b`.
///
/// Zero when both fall on the same day, negative when `b` is before `a`.
/// `days_between(today, due) <= 0` reads as "due or overdue".
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Calendar day of a timestamp, time-of-day stripped
pub fn day_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Next due date for a recurrence.
///
/// Monthly keeps the day-of-month and clips to the last day of a shorter
/// month (Jan 31 -> Feb 28/29). `None` returns the date unchanged.
pub fn advance(date: NaiveDate, kind: RecurrenceKind) -> NaiveDate {
    let next = match kind {
        RecurrenceKind::None => Some(date),
        RecurrenceKind::Daily => date.checked_add_days(Days::new(1)),
        RecurrenceKind::Weekly => date.checked_add_days(Days::new(7)),
        RecurrenceKind::Monthly => date.checked_add_months(Months::new(1)),
    };
    // Only overflows at NaiveDate::MAX
    next.unwrap_or(NaiveDate::MAX)
}

/// Parse an ISO calendar date (`YYYY-MM-DD`)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}
