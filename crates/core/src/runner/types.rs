//! Types for the runner module.

use serde::{Deserialize, Serialize};

/// Exit code recorded when a process could not be spawned or was killed by a signal.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Captured output of one finished process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Snapshot of one completed external invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommandLog {
    pub command: String,
    pub args: Vec<String>,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandLog {
    /// Builds a log from a finished process.
    pub fn from_output(command: &str, args: &[String], output: &CommandOutput) -> Self {
        Self {
            command: command.to_string(),
            args: args.to_vec(),
            exit_code: output.exit_code,
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        }
    }

    /// Builds a log for an invocation that produced no output.
    pub fn without_output(command: &str, args: &[String]) -> Self {
        Self {
            command: command.to_string(),
            args: args.to_vec(),
            exit_code: UNKNOWN_EXIT_CODE,
            ..Default::default()
        }
    }
}
