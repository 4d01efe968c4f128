//! Error types for the transcriber module.

use thiserror::Error;

use crate::job::JobError;
use crate::settings::SettingsError;

/// Errors returned synchronously by [`super::Transcriber`] operations.
///
/// Pipeline failures never surface here; they are reported as events.
#[derive(Debug, Error)]
pub enum TranscriberError {
    #[error("load settings: {0}")]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl TranscriberError {
    pub fn is_already_running(&self) -> bool {
        matches!(self, Self::Job(JobError::AlreadyRunning))
    }

    pub fn is_no_running_job(&self) -> bool {
        matches!(self, Self::Job(JobError::NoRunningJob))
    }
}
