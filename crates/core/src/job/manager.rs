//! Single-job state machine.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use super::types::{Job, JobStatus};

/// Usage errors returned by the job state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobError {
    /// A job is already in an active stage.
    #[error("job already running")]
    AlreadyRunning,

    /// Cancel was requested while nothing is running.
    #[error("no running job")]
    NoRunningJob,

    /// The requested edge is not in the transition table.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// A non-idle transition was requested before any job was started.
    #[error("cannot transition to {to} without an active job")]
    NoActiveJob { to: JobStatus },
}

/// Tracks the single allowed job and enforces legal transitions.
///
/// All operations take the lock only for the duration of an in-memory update,
/// so they are safe to call from synchronous pipeline callbacks.
#[derive(Debug, Default)]
pub struct JobManager {
    current: RwLock<Job>,
}

impl JobManager {
    /// Creates a manager in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the job record with `{id, Preprocessing}`.
    pub fn start(&self, job_id: impl Into<String>) -> Result<(), JobError> {
        let mut current = self.write();
        if current.status.is_active() {
            return Err(JobError::AlreadyRunning);
        }
        *current = Job::new(job_id, JobStatus::Preprocessing);
        Ok(())
    }

    /// Moves the current job to `to`.
    ///
    /// Transitioning to the current status is a no-op.
    pub fn transition(&self, to: JobStatus) -> Result<(), JobError> {
        let mut current = self.write();
        if to == current.status {
            return Ok(());
        }
        if !current.has_id() && to != JobStatus::Idle {
            return Err(JobError::NoActiveJob { to });
        }
        if !current.status.can_transition_to(to) {
            return Err(JobError::InvalidTransition {
                from: current.status,
                to,
            });
        }
        current.status = to;
        Ok(())
    }

    /// Marks an active job as cancelled.
    pub fn cancel(&self) -> Result<(), JobError> {
        let mut current = self.write();
        if !current.status.is_active() {
            return Err(JobError::NoRunningJob);
        }
        current.status = JobStatus::Cancelled;
        Ok(())
    }

    /// Returns a snapshot of the current job.
    pub fn current(&self) -> Job {
        self.read().clone()
    }

    /// Whether the current job is in an active stage.
    pub fn is_running(&self) -> bool {
        self.read().status.is_active()
    }

    /// Clears the job id and returns to idle.
    pub fn reset(&self) {
        *self.write() = Job::default();
    }

    // A panic while holding the lock cannot leave the record half-written,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Job> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Job> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}
