//! Types for the pipeline module.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::runner::CommandLog;

/// Inputs for one transcription run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptionRequest {
    /// Media file to transcribe.
    pub input_path: PathBuf,
    /// Model file, or a directory searched for `.bin`/`.gguf` models.
    pub model_path: PathBuf,
    /// Language hint; empty or `auto` lets the recognizer detect it.
    pub language: String,
    /// Directory the transcript is written into.
    pub output_dir: PathBuf,
}

/// Output of a successful run.
#[derive(Debug)]
pub struct TranscriptionResult {
    pub preprocessed_audio_path: PathBuf,
    pub text_path: PathBuf,
    /// Transcript contents, trimmed of surrounding whitespace.
    pub transcript: String,
    /// Every command executed, in order.
    pub logs: Vec<CommandLog>,
    /// Scratch directory holding intermediate files. The caller releases it.
    pub workspace: Workspace,
}

/// Per-run scratch directory.
///
/// Dropping a workspace removes it silently; [`Workspace::release`] removes
/// it and reports failures. Release is idempotent.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl Workspace {
    pub(crate) fn new(dir: TempDir) -> Self {
        Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_released(&self) -> bool {
        self.dir.is_none()
    }

    /// Removes the directory tree. Subsequent calls are no-ops.
    pub fn release(&mut self) -> std::io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}
