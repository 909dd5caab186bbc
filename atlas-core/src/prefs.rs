//! src/prefs.rs
//! ============================================================================
//! # Persisted preferences
//!
//! A tiny string key-value store that survives restarts. Only the theme uses
//! it today. The file-backed store keeps a flat TOML table next to
//! `config.toml`. Inside a runtime its writes run in order on a background
//! task through `tokio::fs`.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use parking_lot::{Mutex, RwLock};
use tokio::{fs as TokioFs, runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::error::AppError;

pub const PREFERENCES_FILE: &str = "preferences.toml";

pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
}

/// Preferences kept only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a TOML table. Every `set` rewrites the file.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable preferences");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), entries = values.len(), "Preferences loaded");

        Self {
            path,
            values: RwLock::new(values),
            pending: Mutex::new(None),
        }
    }

    /// Open `preferences.toml` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::open(dir.join(PREFERENCES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, String>, AppError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = fs::read_to_string(path).map_err(|e| AppError::file_access(path, e))?;
        Ok(toml::from_str(&text)?)
    }

    fn write_blocking(&self, text: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::file_access(parent, e))?;
        }
        fs::write(&self.path, text).map_err(|e| AppError::file_access(&self.path, e))
    }

    /// Wait for the last queued write to land.
    pub async fn flush(&self) {
        let pending = self.pending.lock().take();
        if let Some(task) = pending {
            if let Err(e) = task.await {
                warn!(error = %e, "Preference write task failed");
            }
        }
    }
}

async fn write_file(path: &Path, text: String) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        TokioFs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_access(parent, e))?;
    }
    TokioFs::write(path, text)
        .await
        .map_err(|e| AppError::file_access(path, e))
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let text = {
            let mut values = self.values.write();
            values.insert(key.to_string(), value.to_string());
            toml::to_string(&*values)?
        };

        let Ok(handle) = Handle::try_current() else {
            self.write_blocking(&text)?;
            info!(key, value, "Preference saved");
            return Ok(());
        };

        let mut pending = self.pending.lock();
        let previous = pending.take();
        let path = self.path.clone();
        let (key, value) = (key.to_string(), value.to_string());
        *pending = Some(handle.spawn(async move {
            if let Some(previous) = previous {
                let _ = previous.await;
            }
            match write_file(&path, text).await {
                Ok(()) => info!(key, value, "Preference saved"),
                Err(e) => warn!(error = %e, "Could not persist preference"),
            }
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let store = FilePreferenceStore::in_dir(&dir.path().join("nested"));
        store.set("theme", "dark").unwrap();

        let reopened = FilePreferenceStore::in_dir(&dir.path().join("nested"));
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_file_store_writes_off_the_caller() {
        let dir = TempDir::new().unwrap();
        let store = FilePreferenceStore::in_dir(&dir.path().join("nested"));
        store.set("theme", "light").unwrap();
        store.set("theme", "dark").unwrap();
        // the in-memory value is visible before the disk catches up
        assert_eq!(store.get("theme").as_deref(), Some("dark"));

        store.flush().await;
        let reopened = FilePreferenceStore::in_dir(&dir.path().join("nested"));
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_store_ignores_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PREFERENCES_FILE);
        fs::write(&path, "theme = [not toml").unwrap();

        let store = FilePreferenceStore::open(&path);
        assert_eq!(store.get("theme"), None);
    }
}
