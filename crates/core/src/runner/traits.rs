//! Trait definitions for the runner module.

use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::error::RunnerError;
use super::types::CommandOutput;

/// Executes one external process to completion.
///
/// Implementations must terminate the child and return
/// [`RunnerError::Cancelled`] once `cancel` fires. A non-zero exit status is
/// not an error at this level; callers inspect [`CommandOutput::exit_code`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `program` with `args`, capturing stdout, stderr and exit code.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunnerError>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn run(
        &self,
        program: &str,
        args: &[String],
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunnerError> {
        (**self).run(program, args, cancel).await
    }
}
