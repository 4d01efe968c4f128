//! User settings persistence.
//!
//! Settings are a small JSON record holding the model location, the output
//! directory and the language hint. The transcriber reloads them through a
//! [`SettingsProvider`] at the start of every job.

mod error;
mod store;
mod types;

pub use error::SettingsError;
pub use store::{JsonSettingsStore, SettingsProvider};
pub use types::Settings;
