//! External process execution.
//!
//! The [`CommandRunner`] trait is the seam between the transcription
//! pipeline and the operating system. [`ProcessRunner`] spawns real
//! processes; `testing::MockCommandRunner` scripts them for tests.

mod error;
mod process;
mod traits;
mod types;

pub use error::RunnerError;
pub use process::ProcessRunner;
pub use traits::CommandRunner;
pub use types::{CommandLog, CommandOutput, UNKNOWN_EXIT_CODE};
