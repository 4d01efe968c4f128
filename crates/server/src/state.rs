use transcriber_core::{Config, Transcriber};

/// Shared application state
pub struct AppState {
    config: Config,
    transcriber: Transcriber,
}

impl AppState {
    pub fn new(config: Config, transcriber: Transcriber) -> Self {
        Self {
            config,
            transcriber,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transcriber(&self) -> &Transcriber {
        &self.transcriber
    }
}
