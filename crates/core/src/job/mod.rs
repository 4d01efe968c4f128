//! Job lifecycle state machine.
//!
//! Exactly one job exists at a time. It moves through
//! `preprocessing -> transcribing -> exporting -> done`, with `failed` and
//! `cancelled` reachable from every active stage.

mod manager;
mod types;

pub use manager::{JobError, JobManager};
pub use types::{Job, JobStatus};
