//! Reminder scheduler
//!
//! Drives [`InvoiceService::scan_overdue`] on a fixed period and tells
//! observers that reminder state changed.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start()──▶ Running ──stop()──▶ Idle
//!                     │  ▲
//!                     └──┘ start() again: previous ticker is stopped first
//! ```
//!
//! Each tick scans with the service clock's current time, then publishes
//! `ReminderEvent::Refreshed` on the service event bus. The scheduler keeps
//! no persistent state of its own; only the invoices' `notified` flags
//! survive a restart.

use crate::billing::{InvoiceService, ScanReport};
use crate::core::error::BillingResult;
use crate::core::events::{BillingEvent, ReminderEvent};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

pub struct ReminderScheduler {
    service: Arc<InvoiceService>,
    period: Duration,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl ReminderScheduler {
    /// Create a scheduler ticking at the service's configured check interval
    pub fn new(service: Arc<InvoiceService>) -> Self {
        let period = service.reminder_config().check_interval();
        Self::with_period(service, period)
    }

    pub fn with_period(service: Arc<InvoiceService>, period: Duration) -> Self {
        Self {
            service,
            period: period.max(Duration::from_millis(1)),
            ticker: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn ticker(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SchedulerState {
        match self.ticker().as_ref() {
            Some(handle) if !handle.is_finished() => SchedulerState::Running,
            _ => SchedulerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Start ticking. The first tick fires one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker();
        if let Some(previous) = ticker.take() {
            previous.abort();
            tracing::debug!("Replaced running reminder ticker");
        }

        let service = Arc::clone(&self.service);
        let period = self.period;
        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if let Err(error) = run_tick(&service).await {
                    tracing::error!(error = %error, "Reminder scan failed");
                }
            }
        }));

        tracing::info!(period_secs = period.as_secs_f64(), "Reminder scheduler started");
    }

    /// Stop ticking. Returns whether a ticker was running.
    pub fn stop(&self) -> bool {
        match self.ticker().take() {
            Some(handle) => {
                handle.abort();
                tracing::info!("Reminder scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Run one scan immediately, outside the timer
    pub async fn tick(&self) -> BillingResult<ScanReport> {
        run_tick(&self.service).await
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker().take() {
            handle.abort();
        }
    }
}

async fn run_tick(service: &InvoiceService) -> BillingResult<ScanReport> {
    let now = service.clock().utc();
    let report = service.scan_overdue(now).await?;

    service.events().publish(
        BillingEvent::Reminder(ReminderEvent::Refreshed {
            newly_notified: report.newly_notified.iter().map(|i| i.id).collect(),
            upcoming: report.upcoming.iter().map(|i| i.id).collect(),
        }),
        now,
    );

    Ok(report)
}
