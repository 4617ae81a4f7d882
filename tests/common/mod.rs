//! Shared fixtures for integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::broadcast;

use vibrance::error::StorageError;
use vibrance::models::preset::PresetPatch;
use vibrance::models::StoredConfig;
use vibrance::services::{SettingsStore, StorageChange};

/// A stored configuration with one preset patched and activated.
pub fn stored_with(preset: &str, patch: PresetPatch) -> StoredConfig {
    let mut presets = HashMap::new();
    presets.insert(preset.to_string(), patch);
    StoredConfig {
        enabled: Some(true),
        active_preset: Some(preset.to_string()),
        presets: Some(presets),
    }
}

/// Store whose reads always fail, for testing the neutral-default
/// recovery path.
pub struct FailingStore {
    sender: broadcast::Sender<StorageChange>,
}

impl FailingStore {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }
}

impl Default for FailingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsStore for FailingStore {
    async fn get(&self) -> Result<StoredConfig, StorageError> {
        Err(StorageError::Unavailable("backend gone".to_string()))
    }

    async fn set(&self, _config: &StoredConfig) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("backend gone".to_string()))
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.sender.subscribe()
    }
}
