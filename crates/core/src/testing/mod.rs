//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external collaborator
//! traits, allowing full job lifecycle tests without real tools on PATH.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use transcriber_core::testing::{fixtures, MockCommandRunner, MockSettingsProvider};
//!
//! let media = fixtures::MediaFixture::new();
//! let runner = MockCommandRunner::new();
//! fixtures::script_success(&runner, "hello").await;
//!
//! let settings = MockSettingsProvider::with_settings(media.settings());
//! // Build a Transcriber with Arc::new(runner.clone()) and Arc::new(settings)...
//! ```

mod mock_runner;
mod mock_settings;
mod observer;

pub use mock_runner::{MockCommandRunner, RecordedCall, ScriptedCommand};
pub use mock_settings::MockSettingsProvider;
pub use observer::RecordingObserver;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::PathBuf;
    use tempfile::TempDir;

    use super::{MockCommandRunner, ScriptedCommand};
    use crate::pipeline::PipelineConfig;
    use crate::settings::Settings;

    /// Name of the fake media file created by [`MediaFixture`].
    pub const INPUT_FILE: &str = "clip.mp4";

    /// A scratch tree with an input file, a model directory and an output location.
    ///
    /// Layout under `root`: `clip.mp4`, `models/ggml-base.bin`, `out/`
    /// (not created) and `tmp/` for workspaces.
    pub struct MediaFixture {
        pub root: TempDir,
        pub input: PathBuf,
        pub model_dir: PathBuf,
        pub output_dir: PathBuf,
        pub temp_root: PathBuf,
    }

    impl Default for MediaFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MediaFixture {
        pub fn new() -> Self {
            let root = tempfile::tempdir().expect("create fixture dir");
            let input = root.path().join(INPUT_FILE);
            std::fs::write(&input, b"not really media").expect("write input");

            let model_dir = root.path().join("models");
            std::fs::create_dir(&model_dir).expect("create model dir");
            std::fs::write(model_dir.join("ggml-base.bin"), b"model").expect("write model");

            let output_dir = root.path().join("out");
            let temp_root = root.path().join("tmp");
            Self {
                input,
                model_dir,
                output_dir,
                temp_root,
                root,
            }
        }

        /// Settings pointing at the fixture's model directory and output dir.
        pub fn settings(&self) -> Settings {
            Settings {
                model_path: self.model_dir.to_string_lossy().into_owned(),
                output_dir: self.output_dir.to_string_lossy().into_owned(),
                language: "auto".to_string(),
            }
        }

        /// Default tools with workspaces placed under `tmp/`.
        pub fn pipeline_config(&self) -> PipelineConfig {
            PipelineConfig {
                temp_dir: Some(self.temp_root.clone()),
                ..PipelineConfig::default()
            }
        }

        /// Workspaces still present under `tmp/`.
        pub fn workspaces_left(&self) -> usize {
            std::fs::read_dir(&self.temp_root)
                .map(|entries| entries.count())
                .unwrap_or(0)
        }
    }

    /// Scripts both default tools to succeed, whisper.cpp writing `transcript`.
    pub async fn script_success(runner: &MockCommandRunner, transcript: &str) {
        runner
            .script(
                "ffmpeg",
                ScriptedCommand::success().writes_arg_file(-1, "RIFF"),
            )
            .await;
        runner
            .script(
                "whisper.cpp",
                ScriptedCommand::success().writes_arg_file_with_suffix("-of", ".txt", transcript),
            )
            .await;
    }
}
