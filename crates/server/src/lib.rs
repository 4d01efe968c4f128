//! HTTP and WebSocket boundary for the transcription service.

pub mod api;
pub mod metrics;
pub mod state;
