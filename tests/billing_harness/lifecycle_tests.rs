//! Macro-generated lifecycle suite run against any `BillingStore`.
//!
//! # Generated Tests
//!
//! ## Lifecycle
//! - `test_monthly_invoice_paid_spawns_successor`: the Acme walk-through
//! - `test_create_prepends_newest_first`
//! - `test_create_rejects_bad_input`: nothing persisted
//! - `test_edit_unknown_id`: NotFound, collection unchanged
//! - `test_edit_keeps_payment_and_notification_state`
//! - `test_mark_paid_twice`: one successor only
//! - `test_mark_paid_one_off`: no successor
//! - `test_delete_unknown_id`: silent no-op
//! - `test_delete_removes_only_target`
//!
//! ## Reminders
//! - `test_scan_notifies_once`
//! - `test_scan_skips_paid_and_future`
//! - `test_late_daily_successor_is_notified_separately`
//! - `test_scan_survives_failing_sink`
//!
//! ## Other collections
//! - `test_payment_methods_and_settings`
//! - `test_export_import_reset`

/// Generate the lifecycle suite.
///
/// `$factory` must evaluate to `Arc<S>` with `S: BillingStore + 'static`.
/// It is re-evaluated for each test, and may contain `.await`.
#[macro_export]
macro_rules! billing_store_tests {
    ($factory:expr) => {
        mod billing_store_contract_tests {
            use super::*;
            use smartbills::core::date::RecurrenceKind;
            use smartbills::core::error::BillingError;
            use smartbills::core::invoice::InvoiceInput;
            use smartbills::core::payment::PaymentMethodInput;
            use smartbills::core::settings::Theme;
            use mockable::Clock;
            use smartbills::billing::InvoiceService;
            use std::sync::Arc;
            use tokio_test::{assert_err, assert_ok};
            use uuid::Uuid;

            const NOW: &str = "2024-06-01T09:00:00Z";

            // ==================================================================
            // Lifecycle
            // ==================================================================

            #[tokio::test]
            async fn test_monthly_invoice_paid_spawns_successor() {
                let billing = Billing::over($factory, NOW);
                let invoice = billing
                    .invoices
                    .create(
                        InvoiceInput::new("Acme", 100.0, "2024-06-01")
                            .with_recurrence(RecurrenceKind::Monthly),
                    )
                    .await
                    .unwrap();

                billing.invoices.mark_paid(invoice.id).await.unwrap();

                let all = billing.invoices.list().await.unwrap();
                assert_eq!(all.len(), 2);

                let original = &all[position(&all, invoice.id).unwrap()];
                assert!(original.paid);
                assert!(original.paid_at.is_some());

                let successor = all.iter().find(|i| i.id != invoice.id).unwrap();
                assert!(!successor.paid);
                assert!(!successor.notified);
                assert_eq!(successor.due, date("2024-07-01"));
                assert_eq!(successor.client, "Acme");
                assert_eq!(successor.amount, 100.0);
                assert_eq!(successor.recurrence, RecurrenceKind::Monthly);
            }

            #[tokio::test]
            async fn test_create_prepends_newest_first() {
                let billing = Billing::over($factory, NOW);
                let first = billing
                    .invoices
                    .create(InvoiceInput::new("First", 1.0, "2024-07-01"))
                    .await
                    .unwrap();
                let second = billing
                    .invoices
                    .create(InvoiceInput::new("Second", 2.0, "2024-07-02"))
                    .await
                    .unwrap();

                let ids: Vec<Uuid> = billing
                    .invoices
                    .list()
                    .await
                    .unwrap()
                    .iter()
                    .map(|i| i.id)
                    .collect();
                assert_eq!(ids, vec![second.id, first.id]);
            }

            #[tokio::test]
            async fn test_create_rejects_bad_input() {
                let billing = Billing::over($factory, NOW);

                let err = billing
                    .invoices
                    .create(InvoiceInput::new("  ", -5.0, "June 1st"))
                    .await
                    .unwrap_err();

                assert_eq!(err.error_code(), "VALIDATION_ERROR");
                assert!(billing.invoices.list().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_edit_unknown_id() {
                let billing = Billing::over($factory, NOW);
                let kept = billing
                    .invoices
                    .create(InvoiceInput::new("Kept", 10.0, "2024-07-01"))
                    .await
                    .unwrap();

                let result = billing
                    .invoices
                    .edit(Uuid::new_v4(), InvoiceInput::new("Ghost", 1.0, "2024-07-01"))
                    .await;

                assert!(matches!(result, Err(BillingError::NotFound { .. })));
                assert_eq!(billing.invoices.list().await.unwrap(), vec![kept]);
            }

            #[tokio::test]
            async fn test_edit_keeps_payment_and_notification_state() {
                let billing = Billing::over($factory, NOW);
                let invoice = billing
                    .invoices
                    .create(InvoiceInput::new("Initech", 50.0, "2024-05-01"))
                    .await
                    .unwrap();
                billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();
                let paid = billing.invoices.mark_paid(invoice.id).await.unwrap().invoice;

                billing.clock.advance_days(1);
                let edited = billing
                    .invoices
                    .edit(
                        invoice.id,
                        InvoiceInput::new("Initech LLC", 55.5, "2024-05-02").with_notes("renamed"),
                    )
                    .await
                    .unwrap();

                assert_eq!(edited.client, "Initech LLC");
                assert_eq!(edited.amount, 55.5);
                assert_eq!(edited.due, date("2024-05-02"));
                assert_eq!(edited.notes.as_deref(), Some("renamed"));
                assert!(edited.paid);
                assert!(edited.notified);
                assert_eq!(edited.paid_at, paid.paid_at);
                assert_eq!(edited.created_at, invoice.created_at);
                assert!(edited.updated_at.is_some());
                assert_eq!(billing.invoices.get(invoice.id).await.unwrap(), edited);
            }

            #[tokio::test]
            async fn test_mark_paid_twice() {
                let billing = Billing::over($factory, NOW);
                let invoice = billing
                    .invoices
                    .create(
                        InvoiceInput::new("Hooli", 20.0, "2024-06-10")
                            .with_recurrence(RecurrenceKind::Weekly),
                    )
                    .await
                    .unwrap();

                let first = billing.invoices.mark_paid(invoice.id).await.unwrap();
                billing.clock.advance_days(2);
                let second = billing.invoices.mark_paid(invoice.id).await.unwrap();

                assert_eq!(first.successor.unwrap().due, date("2024-06-17"));
                assert!(second.already_paid);
                assert!(second.successor.is_none());
                assert_eq!(second.invoice.paid_at, first.invoice.paid_at);
                assert_eq!(billing.invoices.list().await.unwrap().len(), 2);
            }

            #[tokio::test]
            async fn test_mark_paid_one_off() {
                let billing = Billing::over($factory, NOW);
                let invoice = billing
                    .invoices
                    .create(InvoiceInput::new("Umbrella", 75.0, "2024-06-01"))
                    .await
                    .unwrap();

                let outcome = billing.invoices.mark_paid(invoice.id).await.unwrap();

                assert!(outcome.successor.is_none());
                assert_eq!(billing.invoices.list().await.unwrap().len(), 1);
                assert!(matches!(
                    billing.invoices.mark_paid(Uuid::new_v4()).await,
                    Err(BillingError::NotFound { .. })
                ));
            }

            #[tokio::test]
            async fn test_delete_unknown_id() {
                let billing = Billing::over($factory, NOW);
                let kept = billing
                    .invoices
                    .create(InvoiceInput::new("Kept", 10.0, "2024-07-01"))
                    .await
                    .unwrap();

                let removed = assert_ok!(billing.invoices.delete(Uuid::new_v4()).await);

                assert!(!removed);
                assert_eq!(billing.invoices.list().await.unwrap(), vec![kept]);
            }

            #[tokio::test]
            async fn test_delete_removes_only_target() {
                let billing = Billing::over($factory, NOW);
                let a = billing
                    .invoices
                    .create(InvoiceInput::new("A", 1.0, "2024-07-01"))
                    .await
                    .unwrap();
                let b = billing
                    .invoices
                    .create(InvoiceInput::new("B", 2.0, "2024-07-02"))
                    .await
                    .unwrap();

                assert!(billing.invoices.delete(a.id).await.unwrap());

                assert_eq!(billing.invoices.list().await.unwrap(), vec![b]);
                assert_err!(billing.invoices.get(a.id).await);
            }

            // ==================================================================
            // Reminders
            // ==================================================================

            #[tokio::test]
            async fn test_scan_notifies_once() {
                let billing = Billing::over($factory, NOW);
                let due_today = billing
                    .invoices
                    .create(InvoiceInput::new("Today", 10.0, "2024-06-01"))
                    .await
                    .unwrap();
                let overdue = billing
                    .invoices
                    .create(InvoiceInput::new("Late", 20.0, "2024-05-15"))
                    .await
                    .unwrap();

                let first = billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();
                billing.clock.advance_days(1);
                let second = billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();

                assert_eq!(first.newly_notified.len(), 2);
                assert!(second.newly_notified.is_empty());

                let mut delivered = billing.sink.ids();
                delivered.sort();
                let mut expected = vec![due_today.id, overdue.id];
                expected.sort();
                assert_eq!(delivered, expected);

                assert!(billing.invoices.list().await.unwrap().iter().all(|i| i.notified));
            }

            #[tokio::test]
            async fn test_scan_skips_paid_and_future() {
                let billing = Billing::over($factory, NOW);
                let paid = billing
                    .invoices
                    .create(InvoiceInput::new("Paid", 10.0, "2024-05-01"))
                    .await
                    .unwrap();
                billing.invoices.mark_paid(paid.id).await.unwrap();
                let future = billing
                    .invoices
                    .create(InvoiceInput::new("Soon", 10.0, "2024-06-04"))
                    .await
                    .unwrap();

                let report = billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();

                assert!(report.newly_notified.is_empty());
                assert!(billing.sink.ids().is_empty());
                let upcoming: Vec<Uuid> = report.upcoming.iter().map(|i| i.id).collect();
                assert_eq!(upcoming, vec![future.id]);

                billing.clock.set("2024-06-04T00:00:01Z");
                let report = billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();
                assert_eq!(report.newly_notified.len(), 1);
                assert_eq!(billing.sink.clients(), vec!["Soon".to_string()]);
            }

            #[tokio::test]
            async fn test_late_daily_successor_is_notified_separately() {
                let billing = Billing::over($factory, NOW);
                let invoice = billing
                    .invoices
                    .create(
                        InvoiceInput::new("Daily", 3.0, "2024-05-01")
                            .with_recurrence(RecurrenceKind::Daily),
                    )
                    .await
                    .unwrap();

                billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();
                let successor = billing
                    .invoices
                    .mark_paid(invoice.id)
                    .await
                    .unwrap()
                    .successor
                    .unwrap();
                billing.invoices.scan_overdue(billing.clock.utc()).await.unwrap();

                // Successor follows the original due date, not the payment date
                assert_eq!(successor.due, date("2024-05-02"));
                assert_eq!(billing.sink.ids(), vec![invoice.id, successor.id]);
            }

            #[tokio::test]
            async fn test_scan_survives_failing_sink() {
                let store = $factory;
                let clock = FixedClock::at(NOW);
                let service = InvoiceService::new(store.clone(), clock.clone())
                    .with_sink(Arc::new(UnsupportedSink));
                service
                    .create(InvoiceInput::new("Late", 10.0, "2024-05-01"))
                    .await
                    .unwrap();

                let report = assert_ok!(service.scan_overdue(clock.utc()).await);
                assert_eq!(report.newly_notified.len(), 1);

                let again = service.scan_overdue(clock.utc()).await.unwrap();
                assert!(again.newly_notified.is_empty());
            }

            // ==================================================================
            // Other collections
            // ==================================================================

            #[tokio::test]
            async fn test_payment_methods_and_settings() {
                let billing = Billing::over($factory, NOW);

                let card = billing
                    .payments
                    .create(PaymentMethodInput::new("Visa", "4242").with_expiry("12/27"))
                    .await
                    .unwrap();
                assert_err!(billing.payments.create(PaymentMethodInput::new("Bad", "12ab")).await);
                assert_eq!(billing.payments.list().await.unwrap(), vec![card.clone()]);

                assert_eq!(billing.settings.toggle_theme().await.unwrap(), Theme::Dark);
                billing.settings.set_notifications_enabled(true).await.unwrap();
                let settings = billing.settings.get().await.unwrap();
                assert_eq!(settings.theme, Theme::Dark);
                assert!(settings.notifications_enabled);

                assert!(billing.payments.delete(card.id).await.unwrap());
                assert!(!billing.payments.delete(card.id).await.unwrap());
            }

            #[tokio::test]
            async fn test_export_import_reset() {
                let billing = Billing::over($factory, NOW);
                billing
                    .invoices
                    .create(InvoiceInput::new("Acme", 100.0, "2024-06-01"))
                    .await
                    .unwrap();
                billing
                    .payments
                    .create(PaymentMethodInput::new("Amex", "0005"))
                    .await
                    .unwrap();
                let exported = billing.transfer.export_json().await.unwrap();

                billing.transfer.reset().await.unwrap();
                assert!(billing.invoices.list().await.unwrap().is_empty());
                assert!(billing.payments.list().await.unwrap().is_empty());

                assert_err!(billing.transfer.import_json("{ broken").await);
                assert!(billing.invoices.list().await.unwrap().is_empty());

                let bundle = billing.transfer.import_json(&exported).await.unwrap();
                assert_eq!(bundle.invoices.len(), 1);
                assert_eq!(billing.invoices.list().await.unwrap(), bundle.invoices);
                assert_eq!(billing.payments.list().await.unwrap(), bundle.payments);
            }
        }
    };
}
