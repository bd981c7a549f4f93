/// Model configuration.
///
/// Every field has a default so an empty JSON object (`{}`) is a valid
/// configuration file.
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of scan messages applied per [`crate::FileSystemModel::process_scan_events`] call.
///
/// A UI pumps once per frame; 512 single-row insertions per frame keeps the
/// frame time bounded even when a huge directory floods the channel.
pub const DEFAULT_MAX_EVENTS_PER_PUMP: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Scan worker threads (0 = one per logical CPU).
    pub worker_threads: usize,

    /// Upper bound on scan messages drained per non-blocking pump.
    pub max_events_per_pump: usize,

    /// Describe symlink targets rather than the links themselves.
    pub follow_symlinks: bool,

    /// Include dot-prefixed entries.
    pub include_hidden: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            max_events_per_pump: DEFAULT_MAX_EVENTS_PER_PUMP,
            follow_symlinks: true,
            include_hidden: true,
        }
    }
}

impl ModelConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_events_per_pump == 0 {
            return Err(ConfigError::Invalid {
                message: "max_events_per_pump must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Resolved worker thread count.
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.worker_threads
        }
    }
}
