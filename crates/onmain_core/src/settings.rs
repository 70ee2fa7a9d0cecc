//! Dispatch settings

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

/// Settings for the main queue and the host loop driving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub main_queue_label: String,
    /// Upper bound on jobs run per pump; `None` drains everything queued.
    /// Zero is rejected, since a zero budget would never run anything.
    pub max_jobs_per_pump: Option<NonZeroUsize>,
    pub frame_interval_ms: u64,
}

impl DispatchSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            main_queue_label: "main".to_string(),
            max_jobs_per_pump: None,
            frame_interval_ms: 16,
        }
    }
}
