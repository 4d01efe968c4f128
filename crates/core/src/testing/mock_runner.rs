//! Mock command runner for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::runner::{CommandOutput, CommandRunner, RunnerError};

/// A recorded invocation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
enum FileAction {
    /// Write `contents` to the path at `index` (negative counts from the end).
    WriteArg { index: isize, contents: String },
    /// Write `contents` to the value following `flag`, plus `suffix`.
    WriteAfterFlag {
        flag: String,
        suffix: String,
        contents: String,
    },
    /// Remove the directory containing the value following `flag`.
    RemoveParentOfFlag { flag: String },
}

/// Scripted outcome of one program.
///
/// Unscripted programs succeed with empty output and touch no files.
#[derive(Debug, Clone, Default)]
pub struct ScriptedCommand {
    exit_code: i32,
    stdout: String,
    stderr: String,
    actions: Vec<FileAction>,
    delay: Option<Duration>,
    block_until_cancelled: bool,
    exit_after_cancel: Option<Duration>,
    spawn_error: bool,
}

impl ScriptedCommand {
    /// Exits 0.
    pub fn success() -> Self {
        Self::default()
    }

    /// Exits with `code`.
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::default()
        }
    }

    /// Never finishes on its own; returns `Cancelled` once the token fires.
    pub fn block_until_cancelled() -> Self {
        Self {
            block_until_cancelled: true,
            ..Self::default()
        }
    }

    /// Takes `linger` to exit once cancelled, like a child being killed and reaped.
    pub fn exits_slowly_after_cancel(mut self, linger: Duration) -> Self {
        self.exit_after_cancel = Some(linger);
        self
    }

    /// Fails as if the binary were missing.
    pub fn spawn_error() -> Self {
        Self {
            spawn_error: true,
            ..Self::default()
        }
    }

    pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Sleeps before finishing (cancellable).
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Writes `contents` to the file named by argument `index`.
    ///
    /// `-1` is the last argument, which is where ffmpeg takes its output.
    pub fn writes_arg_file(mut self, index: isize, contents: impl Into<String>) -> Self {
        self.actions.push(FileAction::WriteArg {
            index,
            contents: contents.into(),
        });
        self
    }

    /// Writes `contents` to `<value of flag><suffix>`, e.g. whisper.cpp's `-of base` + `.txt`.
    pub fn writes_arg_file_with_suffix(
        mut self,
        flag: impl Into<String>,
        suffix: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        self.actions.push(FileAction::WriteAfterFlag {
            flag: flag.into(),
            suffix: suffix.into(),
            contents: contents.into(),
        });
        self
    }

    /// Deletes the directory holding the file passed after `flag`.
    pub fn removes_parent_of_flag_arg(mut self, flag: impl Into<String>) -> Self {
        self.actions.push(FileAction::RemoveParentOfFlag { flag: flag.into() });
        self
    }
}

/// Mock implementation of the CommandRunner trait.
///
/// Provides controllable behavior for testing:
/// - Record every invocation
/// - Script exit codes and output per program
/// - Create or delete files the way the real tools would
/// - Block until cancelled, or fail to spawn
///
/// # Example
///
/// ```rust,ignore
/// use transcriber_core::testing::{MockCommandRunner, ScriptedCommand};
///
/// let runner = MockCommandRunner::new();
/// runner.script("ffmpeg", ScriptedCommand::exit(1).stderr("bad input")).await;
///
/// // ... run the pipeline ...
///
/// assert_eq!(runner.calls().await.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockCommandRunner {
    scripts: Arc<RwLock<HashMap<String, ScriptedCommand>>>,
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the outcome for every later run of `program`.
    pub async fn script(&self, program: impl Into<String>, command: ScriptedCommand) {
        self.scripts.write().await.insert(program.into(), command);
    }

    /// Get all recorded invocations, oldest first.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Get the recorded invocations of one program.
    pub async fn calls_to(&self, program: &str) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|call| call.program == program)
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    async fn apply(
        program: &str,
        args: &[String],
        action: &FileAction,
    ) -> Result<(), RunnerError> {
        let io_error = |source: std::io::Error| RunnerError::Io {
            program: program.to_string(),
            source,
        };
        match action {
            FileAction::WriteArg { index, contents } => {
                let path = arg_at(args, *index).ok_or_else(|| missing_arg(program))?;
                tokio::fs::write(path, contents).await.map_err(io_error)
            }
            FileAction::WriteAfterFlag {
                flag,
                suffix,
                contents,
            } => {
                let base = value_after(args, flag).ok_or_else(|| missing_arg(program))?;
                let path = PathBuf::from(format!("{}{}", base, suffix));
                tokio::fs::write(path, contents).await.map_err(io_error)
            }
            FileAction::RemoveParentOfFlag { flag } => {
                let value = value_after(args, flag).ok_or_else(|| missing_arg(program))?;
                match Path::new(value).parent() {
                    Some(parent) => tokio::fs::remove_dir_all(parent).await.map_err(io_error),
                    None => Err(missing_arg(program)),
                }
            }
        }
    }
}

fn arg_at(args: &[String], index: isize) -> Option<&String> {
    let index = if index < 0 {
        args.len().checked_sub(index.unsigned_abs())?
    } else {
        index as usize
    };
    args.get(index)
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1)
}

fn missing_arg(program: &str) -> RunnerError {
    RunnerError::Io {
        program: program.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "scripted file action has no matching argument",
        ),
    }
}

#[async_trait]
impl CommandRunner for MockCommandRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunnerError> {
        self.calls.write().await.push(RecordedCall {
            program: program.to_string(),
            args: args.to_vec(),
        });
        let script = self
            .scripts
            .read()
            .await
            .get(program)
            .cloned()
            .unwrap_or_default();

        let cancelled = || RunnerError::Cancelled {
            program: program.to_string(),
        };

        if cancel.is_cancelled() {
            return Err(cancelled());
        }
        if script.spawn_error {
            return Err(RunnerError::NotFound {
                program: program.to_string(),
            });
        }
        let linger = script.exit_after_cancel.unwrap_or_default();
        if script.block_until_cancelled {
            cancel.cancelled().await;
            tokio::time::sleep(linger).await;
            return Err(cancelled());
        }
        if let Some(delay) = script.delay {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tokio::time::sleep(linger).await;
                    return Err(cancelled());
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }

        for action in &script.actions {
            Self::apply(program, args, action).await?;
        }

        Ok(CommandOutput {
            stdout: script.stdout,
            stderr: script.stderr,
            exit_code: script.exit_code,
        })
    }
}
