//! Configuration for the pipeline module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool locations and workspace placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Audio conversion binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// Speech recognition binary.
    #[serde(default = "default_whisper_path")]
    pub whisper_path: String,

    /// Parent directory for per-job workspaces (system temp dir when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_whisper_path() -> String {
    "whisper.cpp".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            whisper_path: default_whisper_path(),
            temp_dir: None,
        }
    }
}
