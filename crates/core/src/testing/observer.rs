//! Observer that records pipeline notifications.

use std::sync::{Mutex, PoisonError};

use crate::pipeline::{PipelineObserver, Stage};
use crate::runner::CommandLog;

/// Collects stage entries and command logs in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    stages: Mutex<Vec<Stage>>,
    commands: Mutex<Vec<CommandLog>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.stages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn commands(&self) -> Vec<CommandLog> {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn on_stage(&self, stage: Stage) {
        self.stages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stage);
    }

    fn on_command(&self, log: &CommandLog) {
        self.commands
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(log.clone());
    }
}
