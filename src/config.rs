//! Engine configuration, persisted as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default upper bound on the elements one `+` token may absorb.
pub const DEFAULT_QUANTIFIER_BOUND: usize = 32;

/// Tunable behaviour of a [`SoundChanger`](crate::SoundChanger).
///
/// Missing fields take their defaults when loading, so `{}` is a valid
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest number of elements a single `+` token may match
    pub quantifier_bound: usize,
    /// Add missing word boundaries to reconstructed candidates
    pub wrap_boundaries: bool,
    /// Drop repeated reconstruction candidates, keeping the first
    pub dedup_candidates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quantifier_bound: DEFAULT_QUANTIFIER_BOUND,
            wrap_boundaries: true,
            dedup_candidates: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quantifier_bound == 0 {
            return Err(ConfigError::Invalid {
                field: "quantifier_bound",
                reason: "must be at least 1 so that `+` can match".to_string(),
            });
        }
        Ok(())
    }
}
