//! Transcription pipeline.
//!
//! Converts the input media to 16 kHz mono WAV with ffmpeg, runs whisper.cpp
//! on it and reads back the `.txt` transcript. Progress is reported through a
//! [`PipelineObserver`]; external processes go through a
//! [`crate::runner::CommandRunner`].

mod args;
mod config;
mod error;
mod executor;
mod traits;
mod types;

pub use args::{
    build_ffmpeg_args, build_whisper_args, normalize_language, resolve_model_path,
    transcript_file_name, PREPROCESSED_AUDIO_FILE,
};
pub use config::PipelineConfig;
pub use error::{PipelineError, Stage};
pub use executor::TranscriptionPipeline;
pub use traits::{NoopObserver, PipelineObserver};
pub use types::{TranscriptionRequest, TranscriptionResult, Workspace};
