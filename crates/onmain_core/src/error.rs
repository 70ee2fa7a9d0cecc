use std::path::PathBuf;
use thiserror::Error;

/// Errors a queue can report when handed a job.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("queue '{label}' is closed")]
    Closed { label: String },

    #[error("queue '{label}' has no receiver")]
    Disconnected { label: String },
}

/// Errors that can occur while loading dispatch settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}
