//! SmartBills reminder daemon
//!
//! Opens the JSON data directory, runs one overdue scan at startup and then
//! keeps the reminder scheduler ticking until Ctrl+C or SIGTERM.
//!
//! ```text
//! smartbills [config.yaml]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `smartbills=info`).

use anyhow::{Context, Result};
use mockable::DefaultClock;
use smartbills::billing::InvoiceService;
use smartbills::config::BillingConfig;
use smartbills::core::events::{EventBus, EventEnvelope};
use smartbills::core::notify::{LogSink, SettingsGatedSink};
use smartbills::reminders::ReminderScheduler;
use smartbills::storage::JsonFileStore;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smartbills=info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => BillingConfig::from_yaml_file(&path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => BillingConfig::default(),
    };

    let store = Arc::new(
        JsonFileStore::open(&config.data_dir)
            .await
            .with_context(|| format!("failed to open data directory {}", config.data_dir.display()))?,
    );

    let sink = SettingsGatedSink::new(LogSink, Arc::clone(&store));
    let service = Arc::new(
        InvoiceService::new(store, Arc::new(DefaultClock))
            .with_sink(Arc::new(sink))
            .with_event_bus(EventBus::new(config.event_bus_capacity))
            .with_reminder_config(config.reminders.clone()),
    );

    let observer = tokio::spawn(log_events(service.events().subscribe()));

    let stats = service.stats().await?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        invoices = stats.count,
        outstanding = stats.outstanding_total,
        "SmartBills started"
    );

    let scheduler = ReminderScheduler::new(Arc::clone(&service));
    let report = scheduler.tick().await?;
    for invoice in &report.upcoming {
        tracing::info!(
            invoice_id = %invoice.id,
            due = %invoice.due,
            "Upcoming: {} (${:.2})",
            invoice.client,
            invoice.amount
        );
    }
    scheduler.start();

    shutdown_signal().await?;

    scheduler.stop();
    observer.abort();
    tracing::info!("SmartBills shutdown complete");
    Ok(())
}

/// Log every event published on the bus until the bus is dropped
async fn log_events(mut rx: broadcast::Receiver<EventEnvelope>) {
    loop {
        match rx.recv().await {
            Ok(envelope) => {
                tracing::debug!(
                    event_id = %envelope.id,
                    kind = envelope.event.event_kind(),
                    action = envelope.event.action(),
                    invoice_id = ?envelope.event.invoice_id(),
                    "Event"
                );
            }
            Err(broadcast::error::RecvError::Lagged(count)) => {
                tracing::warn!(count = count, "Event observer lagged, {} events skipped", count);
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("EventBus closed, stopping event observer");
                break;
            }
        }
    }
}

async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
            },
            _ = terminate.recv() => {
                tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
            },
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
    }

    Ok(())
}
