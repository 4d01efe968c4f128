//! Error types for the runner module.

use thiserror::Error;

/// Errors that can occur while running an external process.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The program was not found on PATH.
    #[error("{program} not found")]
    NotFound { program: String },

    /// The process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the process or reading its output failed.
    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The cancellation token fired and the process was terminated.
    #[error("{program} was cancelled")]
    Cancelled { program: String },
}

impl RunnerError {
    /// Maps a spawn failure, distinguishing a missing binary.
    pub fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        let program = program.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { program }
        } else {
            Self::Spawn { program, source }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
