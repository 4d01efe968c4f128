//! Trait definitions for the pipeline module.

use super::error::Stage;
use crate::runner::CommandLog;

/// Receives progress notifications while a pipeline runs.
///
/// Callbacks run inline on the pipeline task and must not block.
pub trait PipelineObserver: Send + Sync {
    /// Called on entry to each stage.
    fn on_stage(&self, stage: Stage);

    /// Called after every external command, whatever its outcome.
    fn on_command(&self, log: &CommandLog);
}

/// Observer that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn on_stage(&self, _stage: Stage) {}

    fn on_command(&self, _log: &CommandLog) {}
}
