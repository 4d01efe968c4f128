//! Error types for the pipeline module.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::job::JobStatus;
use crate::runner::{CommandLog, RunnerError};

/// Pipeline phase an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preprocessing,
    Transcribing,
    Exporting,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preprocessing => "preprocessing",
            Stage::Transcribing => "transcribing",
            Stage::Exporting => "exporting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Stage> for JobStatus {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Preprocessing => JobStatus::Preprocessing,
            Stage::Transcribing => JobStatus::Transcribing,
            Stage::Exporting => JobStatus::Exporting,
        }
    }
}

/// Errors that can occur while running the transcription pipeline.
///
/// Every variant carries the [`Stage`] it failed in. Variants raised after an
/// external command ran also carry that command's [`CommandLog`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A request field is missing or points at something unusable.
    #[error("{stage}: {message}")]
    Validation {
        stage: Stage,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// An external tool exited non-zero or could not be started.
    #[error("{stage}: {message} (cmd={} exit={})", .log.command, .log.exit_code)]
    ExternalTool {
        stage: Stage,
        message: String,
        log: CommandLog,
        #[source]
        source: Option<RunnerError>,
    },

    /// A tool reported success but its expected output file is absent.
    #[error("{stage}: {message} (cmd={} exit={})", .log.command, .log.exit_code)]
    MissingArtifact {
        stage: Stage,
        message: String,
        log: CommandLog,
    },

    /// Cancellation was observed during the stage.
    #[error("{stage}: job cancelled")]
    Cancelled {
        stage: Stage,
        log: Option<CommandLog>,
    },

    /// Filesystem failure outside of an external tool.
    #[error("{stage}: {message}")]
    Io {
        stage: Stage,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn validation(stage: Stage, message: impl Into<String>) -> Self {
        Self::Validation {
            stage,
            message: message.into(),
            source: None,
        }
    }

    pub fn validation_io(stage: Stage, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Validation {
            stage,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn io(stage: Stage, message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            stage,
            message: message.into(),
            source,
        }
    }

    /// The stage the failure occurred in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation { stage, .. }
            | Self::ExternalTool { stage, .. }
            | Self::MissingArtifact { stage, .. }
            | Self::Cancelled { stage, .. }
            | Self::Io { stage, .. } => *stage,
        }
    }

    /// The command log of the external invocation that failed, if any.
    pub fn command_log(&self) -> Option<&CommandLog> {
        match self {
            Self::ExternalTool { log, .. } | Self::MissingArtifact { log, .. } => Some(log),
            Self::Cancelled { log, .. } => log.as_ref(),
            Self::Validation { .. } | Self::Io { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
