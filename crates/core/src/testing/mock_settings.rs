//! Mock settings provider for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::settings::{Settings, SettingsError, SettingsProvider};

/// In-memory implementation of the SettingsProvider trait.
///
/// Clones share state, so a test can keep one handle while the transcriber
/// owns another.
#[derive(Debug, Clone)]
pub struct MockSettingsProvider {
    settings: Arc<RwLock<Settings>>,
    /// If set, the next load fails with this message.
    next_error: Arc<RwLock<Option<String>>>,
    save_count: Arc<RwLock<usize>>,
}

impl Default for MockSettingsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSettingsProvider {
    /// Create a provider holding defaults rooted at `/home/test`.
    pub fn new() -> Self {
        Self::with_settings(Settings::defaults_for_home(Path::new("/home/test")))
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: Arc::new(RwLock::new(settings)),
            next_error: Arc::new(RwLock::new(None)),
            save_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Replace the stored settings without going through `save`.
    pub async fn set(&self, settings: Settings) {
        *self.settings.write().await = settings;
    }

    /// Configure the next load to fail.
    pub async fn fail_next_load(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }

    /// Number of successful saves.
    pub async fn save_count(&self) -> usize {
        *self.save_count.read().await
    }
}

#[async_trait]
impl SettingsProvider for MockSettingsProvider {
    async fn load(&self) -> Result<Settings, SettingsError> {
        if let Some(message) = self.next_error.write().await.take() {
            return Err(SettingsError::Read {
                path: PathBuf::from("mock-settings.json"),
                source: std::io::Error::other(message),
            });
        }
        Ok(self.settings.read().await.clone())
    }

    async fn save(&self, settings: Settings) -> Result<Settings, SettingsError> {
        let settings = settings.normalized();
        *self.settings.write().await = settings.clone();
        *self.save_count.write().await += 1;
        Ok(settings)
    }
}
