//! JSON file storage backend.
//!
//! Each collection lives in its own document inside a data directory:
//!
//! - `invoices.json`: ordered invoice array
//! - `payments.json`: ordered payment method array
//! - `settings.json`: settings object
//!
//! A missing document reads as an empty collection (or default settings).
//!
//! # Atomic replacement
//!
//! Writes serialize the full collection into a fresh hidden temp file
//! (`.<name>.tmp.<pid>.<n>`), fsync it, `rename` it over the live document and
//! then sync the directory. A failure at any step leaves the previously
//! persisted document untouched.

use crate::core::error::StorageError;
use crate::core::invoice::Invoice;
use crate::core::payment::PaymentMethod;
use crate::core::settings::Settings;
use crate::core::store::{InvoiceStore, PaymentMethodStore, SettingsStore};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const BACKEND: &str = "json_file";

pub const INVOICES_FILE: &str = "invoices.json";
pub const PAYMENTS_FILE: &str = "payments.json";
pub const SETTINGS_FILE: &str = "settings.json";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// ---------------------------------------------------------------------------
// Serialization helpers
// ---------------------------------------------------------------------------

fn json_encode<T: Serialize>(item: &T) -> Result<Vec<u8>, StorageError> {
    serde_json::to_vec_pretty(item).map_err(|e| StorageError::serialization(BACKEND, e))
}

fn json_decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, StorageError> {
    serde_json::from_slice(bytes)
        .map_err(|e| StorageError::serialization(BACKEND, format!("{}: {}", path.display(), e)))
}

// ---------------------------------------------------------------------------
// Atomic file helpers
// ---------------------------------------------------------------------------

fn temp_name(name: &str) -> String {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(".{}.tmp.{}.{}", name, std::process::id(), counter)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

async fn sync_directory(dir: &Path) {
    // Best effort: not every platform can open a directory for syncing
    if let Ok(handle) = tokio::fs::File::open(dir).await {
        let _ = handle.sync_all().await;
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// File-backed implementation of every store trait
///
/// Clones share the same directory and write lock.
#[derive(Clone)]
pub struct JsonFileStore {
    dir: Arc<PathBuf>,
    // Serializes renames so the last writer to start is the last to land
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileStore {
    /// Open (or create) a data directory at `path`
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(path.as_ref())
            .await
            .map_err(|e| StorageError::io(BACKEND, format!("{}: {}", path.as_ref().display(), e)))?;

        tracing::debug!(dir = %path.as_ref().display(), "Opened JSON file store");

        Ok(Self {
            dir: Arc::new(path.as_ref().to_path_buf()),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, StorageError> {
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(T::default()),
            Ok(bytes) => json_decode(&path, &bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(StorageError::io(BACKEND, format!("{}: {}", path.display(), e))),
        }
    }

    async fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StorageError> {
        let bytes = json_encode(value)?;
        let path = self.dir.join(name);
        let tmp = self.dir.join(temp_name(name));

        let _guard = self.write_lock.lock().await;

        if let Err(e) = write_synced(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(BACKEND, format!("{}: {}", tmp.display(), e)));
        }

        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::io(BACKEND, format!("{}: {}", path.display(), e)));
        }

        sync_directory(&self.dir).await;

        tracing::trace!(file = %path.display(), bytes = bytes.len(), "Replaced collection");
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for JsonFileStore {
    async fn get_invoices(&self) -> Result<Vec<Invoice>, StorageError> {
        self.load(INVOICES_FILE).await
    }

    async fn put_invoices(&self, invoices: Vec<Invoice>) -> Result<(), StorageError> {
        self.save(INVOICES_FILE, &invoices).await
    }
}

#[async_trait]
impl PaymentMethodStore for JsonFileStore {
    async fn get_payment_methods(&self) -> Result<Vec<PaymentMethod>, StorageError> {
        self.load(PAYMENTS_FILE).await
    }

    async fn put_payment_methods(&self, methods: Vec<PaymentMethod>) -> Result<(), StorageError> {
        self.save(PAYMENTS_FILE, &methods).await
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get_settings(&self) -> Result<Settings, StorageError> {
        self.load(SETTINGS_FILE).await
    }

    async fn put_settings(&self, settings: Settings) -> Result<(), StorageError> {
        self.save(SETTINGS_FILE, &settings).await
    }
}
