//! Event payloads published on the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::job::JobStatus;
use crate::runner::CommandLog;

/// Classifies events emitted during job execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Job status changed.
    #[default]
    Status,
    /// An external command completed.
    Log,
    /// The transcript was exported.
    Result,
    /// Something went wrong.
    Error,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Status => "status",
            EventType::Log => "log",
            EventType::Result => "result",
            EventType::Error => "error",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sequenced record consumed by UI subscribers.
///
/// `seq` and `timestamp` are assigned by [`super::EventBus::publish`]; the
/// remaining optional fields depend on the event type and are omitted from
/// the serialized form when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    pub job_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_path: Option<PathBuf>,
}

impl Event {
    /// A status change for `job_id`.
    pub fn status(job_id: impl Into<String>, status: JobStatus, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            event_type: EventType::Status,
            status: Some(status),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A completed external command, carrying its full captured output.
    pub fn log(job_id: impl Into<String>, message: impl Into<String>, log: &CommandLog) -> Self {
        Self {
            job_id: job_id.into(),
            event_type: EventType::Log,
            message: Some(message.into()),
            command: Some(log.command.clone()),
            args: Some(log.args.clone()),
            exit_code: Some(log.exit_code),
            stdout: Some(log.stdout.clone()),
            stderr: Some(log.stderr.clone()),
            ..Default::default()
        }
    }

    /// The exported transcript location.
    pub fn result(job_id: impl Into<String>, text_path: impl Into<PathBuf>) -> Self {
        Self {
            job_id: job_id.into(),
            event_type: EventType::Result,
            status: Some(JobStatus::Done),
            message: Some("Transcript exported".to_string()),
            text_path: Some(text_path.into()),
            ..Default::default()
        }
    }

    /// A failure description.
    pub fn error(job_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            event_type: EventType::Error,
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Attaches a status to the event.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }
}
