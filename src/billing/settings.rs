//! Theme and notification preferences

use crate::core::error::BillingResult;
use crate::core::settings::{Settings, Theme};
use crate::core::store::SettingsStore;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct SettingsService {
    store: Arc<dyn SettingsStore>,
    write_lock: Mutex<()>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn get(&self) -> BillingResult<Settings> {
        Ok(self.store.get_settings().await?)
    }

    pub async fn replace(&self, settings: Settings) -> BillingResult<()> {
        let _guard = self.write_lock.lock().await;
        Ok(self.store.put_settings(settings).await?)
    }

    /// Flip between light and dark, returning the new theme
    pub async fn toggle_theme(&self) -> BillingResult<Theme> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.store.get_settings().await?;
        settings.theme = settings.theme.toggled();
        let theme = settings.theme;
        self.store.put_settings(settings).await?;
        Ok(theme)
    }

    pub async fn set_notifications_enabled(&self, enabled: bool) -> BillingResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.store.get_settings().await?;
        settings.notifications_enabled = enabled;
        self.store.put_settings(settings).await?;
        tracing::info!(enabled, "Reminder notifications toggled");
        Ok(())
    }
}
