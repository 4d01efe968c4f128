//! Types for the job module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of the single transcription job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// No job has been started, or the manager was reset.
    #[default]
    Idle,
    /// Converting input media to 16 kHz mono WAV.
    Preprocessing,
    /// Running speech recognition.
    Transcribing,
    /// Reading back the transcript.
    Exporting,
    /// Completed successfully (terminal).
    Done,
    /// Failed (terminal).
    Failed,
    /// Cancelled by the user (terminal).
    Cancelled,
}

impl JobStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Idle,
        JobStatus::Preprocessing,
        JobStatus::Transcribing,
        JobStatus::Exporting,
        JobStatus::Done,
        JobStatus::Failed,
        JobStatus::Cancelled,
    ];

    /// Returns true while a pipeline stage is executing.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            JobStatus::Preprocessing | JobStatus::Transcribing | JobStatus::Exporting
        )
    }

    /// Returns true for done, failed and cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Done | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Whether the state machine allows moving from `self` to `to`.
    ///
    /// Terminal states may go straight back to `Preprocessing` so a new job
    /// can start without an intermediate reset.
    pub fn can_transition_to(&self, to: JobStatus) -> bool {
        use JobStatus::*;
        match self {
            Idle => to == Preprocessing,
            Preprocessing => matches!(to, Transcribing | Failed | Cancelled),
            Transcribing => matches!(to, Exporting | Failed | Cancelled),
            Exporting => matches!(to, Done | Failed | Cancelled),
            Done | Failed | Cancelled => matches!(to, Preprocessing | Idle),
        }
    }

    /// Lowercase name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Idle => "idle",
            JobStatus::Preprocessing => "preprocessing",
            JobStatus::Transcribing => "transcribing",
            JobStatus::Exporting => "exporting",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the current job identity and status.
///
/// `id` is empty while the manager is idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
}

impl Job {
    pub fn new(id: impl Into<String>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }

    /// Returns true if an id has been assigned.
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}
