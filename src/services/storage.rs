//! Settings storage boundary.
//!
//! The persisted configuration lives behind an opaque asynchronous
//! get/set service with a change-notification subscription. The engine
//! only consumes the local area. [`MemoryStore`] backs tests and the
//! harness; [`JsonFileStore`] persists to a JSON file and turns
//! filesystem events into change notifications.

use async_trait::async_trait;
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, RwLock};

use crate::error::StorageError;
use crate::models::StoredConfig;

/// Storage area a change originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageArea {
    Local,
    Sync,
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub area: StorageArea,
}

/// Opaque asynchronous settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the full persisted configuration.
    async fn get(&self) -> Result<StoredConfig, StorageError>;

    /// Persist the full configuration.
    async fn set(&self, config: &StoredConfig) -> Result<(), StorageError>;

    /// Subscribe to change notifications.
    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

/// In-memory store for tests and the harness.
pub struct MemoryStore {
    config: RwLock<StoredConfig>,
    sender: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(StoredConfig::default())
    }

    pub fn with_config(config: StoredConfig) -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            config: RwLock::new(config),
            sender,
        }
    }

    /// Emit a change notification for an arbitrary area without
    /// touching the stored value, modelling writes that land outside
    /// the local area.
    pub fn notify(&self, area: StorageArea) {
        let _ = self.sender.send(StorageChange { area });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self) -> Result<StoredConfig, StorageError> {
        Ok(self.config.read().await.clone())
    }

    async fn set(&self, config: &StoredConfig) -> Result<(), StorageError> {
        *self.config.write().await = config.clone();
        self.notify(StorageArea::Local);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.sender.subscribe()
    }
}

/// JSON-file-backed store.
///
/// A `notify` watcher on the file's parent directory forwards events
/// touching the settings file as change notifications, so external
/// writers (the settings UI) trigger reconciliation like any other
/// storage change.
pub struct JsonFileStore {
    path: PathBuf,
    sender: broadcast::Sender<StorageChange>,
    /// Handle to the watcher (kept alive)
    _watcher: Option<RecommendedWatcher>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let (sender, _) = broadcast::channel(16);

        let watcher = match Self::start_watcher(&path, sender.clone()) {
            Ok(watcher) => {
                tracing::info!(path = %path.display(), "Settings file watcher started");
                Some(watcher)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to start settings file watcher");
                None
            }
        };

        Self {
            path,
            sender,
            _watcher: watcher,
        }
    }

    fn start_watcher(
        path: &Path,
        sender: broadcast::Sender<StorageChange>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        let watch_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let settings_path = path.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    if event.paths.iter().any(|p| p.ends_with(
                        settings_path
                            .file_name()
                            .unwrap_or(settings_path.as_os_str()),
                    )) {
                        let _ = sender.send(StorageChange {
                            area: StorageArea::Local,
                        });
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        Ok(watcher)
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self) -> Result<StoredConfig, StorageError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to read settings file");
            StorageError::from(e)
        })?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    async fn set(&self, config: &StoredConfig) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, content).await?;
        let _ = self.sender.send(StorageChange {
            area: StorageArea::Local,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let config = StoredConfig::factory();

        store.set(&config).await.unwrap();
        let loaded = store.get().await.unwrap();
        assert_eq!(loaded.enabled, Some(true));
        assert_eq!(loaded.active_preset.as_deref(), Some("balanced"));
    }

    #[tokio::test]
    async fn test_memory_store_notifies_on_set() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.set(&StoredConfig::factory()).await.unwrap();
        let change = rx.try_recv().unwrap();
        assert_eq!(change.area, StorageArea::Local);
    }

    #[tokio::test]
    async fn test_memory_store_notify_carries_area() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        store.notify(StorageArea::Sync);
        let change = rx.try_recv().unwrap();
        assert_eq!(change.area, StorageArea::Sync);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("settings.json"));

        store.set(&StoredConfig::factory()).await.unwrap();
        let loaded = store.get().await.unwrap();
        assert_eq!(loaded.active_preset.as_deref(), Some("balanced"));
        assert_eq!(loaded.presets.map(|p| p.len()), Some(6));
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        let result = store.get().await;
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_store_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = JsonFileStore::new(&path);
        let result = store.get().await;
        assert!(matches!(result, Err(StorageError::Parse(_))));
    }
}
