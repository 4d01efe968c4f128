//! Core of the media transcriber: a single-job orchestrator that drives
//! ffmpeg and whisper.cpp, tracks the job as a state machine and records a
//! bounded, sequenced event log.

pub mod config;
pub mod events;
pub mod job;
pub mod metrics;
pub mod pipeline;
pub mod runner;
pub mod settings;
pub mod testing;
pub mod transcriber;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
};
pub use events::{Event, EventBus, EventType};
pub use job::{Job, JobError, JobManager, JobStatus};
pub use pipeline::{
    PipelineConfig, PipelineError, PipelineObserver, Stage, TranscriptionPipeline,
    TranscriptionRequest, TranscriptionResult,
};
pub use runner::{CommandLog, CommandOutput, CommandRunner, ProcessRunner, RunnerError};
pub use settings::{JsonSettingsStore, Settings, SettingsError, SettingsProvider};
pub use transcriber::{Transcriber, TranscriberError, TranscriberOptions};
