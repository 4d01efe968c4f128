//! Settings providers.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::SettingsError;
use super::types::Settings;

/// Loads and persists [`Settings`].
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Current settings; defaults when nothing has been saved yet.
    async fn load(&self) -> Result<Settings, SettingsError>;

    /// Normalizes and persists `settings`, returning what was stored.
    async fn save(&self, settings: Settings) -> Result<Settings, SettingsError>;
}

/// Settings stored as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
    defaults: Settings,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            defaults: Settings::default(),
        }
    }

    /// Overrides the values returned when the file does not exist.
    pub fn with_defaults(mut self, defaults: Settings) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsProvider for JsonSettingsStore {
    async fn load(&self) -> Result<Settings, SettingsError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Settings file not found, using defaults");
                return Ok(self.defaults.clone());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&data).map_err(|source| SettingsError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, settings: Settings) -> Result<Settings, SettingsError> {
        let settings = settings.normalized();
        let json = serde_json::to_vec_pretty(&settings).map_err(SettingsError::Serialize)?;

        let write_error = |source: std::io::Error| SettingsError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(&self.path, json).await.map_err(write_error)?;

        debug!(path = %self.path.display(), "Settings saved");
        Ok(settings)
    }
}
