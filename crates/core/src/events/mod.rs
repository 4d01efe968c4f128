//! Sequenced job event log.
//!
//! The [`EventBus`] keeps a bounded window of recent events that readers
//! consume incrementally with [`EventBus::since`]. Live delivery is layered
//! on top by the transcriber service.

mod bus;
mod types;

pub use bus::{EventBus, DEFAULT_EVENT_CAPACITY};
pub use types::{Event, EventType};
