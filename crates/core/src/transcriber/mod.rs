//! Job orchestration.
//!
//! [`Transcriber`] is the caller-facing service. It owns the job state
//! machine and the event log, launches one pipeline task per job and turns
//! pipeline progress into job transitions and published events.

mod error;
mod service;

pub use error::TranscriberError;
pub use service::{Transcriber, TranscriberOptions};
