//! Runner backed by real OS processes.

use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::RunnerError;
use super::traits::CommandRunner;
use super::types::{CommandOutput, UNKNOWN_EXIT_CODE};

/// Spawns processes with `tokio::process`.
///
/// stdin is closed, stdout and stderr are captured in full. When the
/// cancellation token fires the child is killed and reaped before `run`
/// returns.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn wait_with_output(child: &mut Child) -> std::io::Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    tokio::try_join!(child.wait(), read_pipe(stdout), read_pipe(stderr))
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunnerError> {
        if cancel.is_cancelled() {
            return Err(RunnerError::Cancelled {
                program: program.to_string(),
            });
        }

        let start = Instant::now();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RunnerError::spawn(program, e))?;

        debug!(command = program, pid = ?child.id(), "Process spawned");

        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = wait_with_output(&mut child) => Some(result),
        };

        let Some(result) = finished else {
            if let Err(e) = child.kill().await {
                warn!(command = program, "Failed to kill cancelled process: {}", e);
            }
            debug!(command = program, "Process terminated after cancellation");
            return Err(RunnerError::Cancelled {
                program: program.to_string(),
            });
        };

        let (status, stdout, stderr) = result.map_err(|source| RunnerError::Io {
            program: program.to_string(),
            source,
        })?;

        let exit_code = status.code().unwrap_or(UNKNOWN_EXIT_CODE);
        debug!(
            command = program,
            exit_code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Process exited"
        );

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_stdout_stderr_and_exit_code() {
        let runner = ProcessRunner::new();
        let token = CancellationToken::new();

        let output = runner
            .run("sh", &sh("echo out; echo err >&2; exit 3"), &token)
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let runner = ProcessRunner::new();
        let token = CancellationToken::new();

        let err = runner
            .run("definitely-not-a-real-binary-xyz", &[], &token)
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancellation_kills_child() {
        let runner = ProcessRunner::new();
        let token = CancellationToken::new();

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });

        let start = Instant::now();
        let err = runner
            .run("sleep", &["30".to_string()], &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_spawn() {
        let runner = ProcessRunner::new();
        let token = CancellationToken::new();
        token.cancel();

        let err = runner
            .run("definitely-not-a-real-binary-xyz", &[], &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
