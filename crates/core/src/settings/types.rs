//! Types for the settings module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Language value meaning "let the recognizer detect it".
pub const AUTO_LANGUAGE: &str = "auto";

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Model file or directory of models.
    #[serde(default)]
    pub model_path: String,
    /// Where transcripts are written.
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::defaults_for_home(&home_dir())
    }
}

impl Settings {
    /// Defaults rooted at `home`.
    pub fn defaults_for_home(home: &Path) -> Self {
        Self {
            model_path: home
                .join(".media-transcriber")
                .join("models")
                .to_string_lossy()
                .into_owned(),
            output_dir: home
                .join("Documents")
                .join("Transcripts")
                .to_string_lossy()
                .into_owned(),
            language: AUTO_LANGUAGE.to_string(),
        }
    }

    /// Trims every field; an empty language becomes `auto`.
    pub fn normalized(self) -> Self {
        let language = self.language.trim();
        Self {
            model_path: self.model_path.trim().to_string(),
            output_dir: self.output_dir.trim().to_string(),
            language: if language.is_empty() {
                AUTO_LANGUAGE.to_string()
            } else {
                language.to_string()
            },
        }
    }
}

fn home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
