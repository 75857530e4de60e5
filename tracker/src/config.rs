use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{provider::WatchOptions, TrackerError};

pub const DEFAULT_LOG_DIR: &str = "log";
pub const MIN_REPLAY_SPEED: f64 = 0.001;
pub const MAX_REPLAY_SPEED: f64 = 1000.;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Options every location subscription is made with.
    pub watch: WatchOptions,
    /// Playback rate of GPX routes, 1.0 is real time.
    pub replay_speed: f64,
    pub log_dir: PathBuf,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            watch: WatchOptions::default(),
            replay_speed: 1.,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
        }
    }
}

impl TrackerConfig {
    /// Reads a JSON config. No path, or a path that does not exist, gives the
    /// defaults. Fields left out of the file keep their default values.
    pub fn load(path: Option<&Path>) -> Result<Self, TrackerError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::debug!("No config at {path:?}, using defaults");
            return Ok(Self::default());
        }

        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes).map_err(|err| TrackerError::Config {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        config.validate(path)?;
        Ok(config)
    }

    pub fn validate(&self, source: &Path) -> Result<(), TrackerError> {
        let invalid = |reason: String| TrackerError::Config {
            path: source.to_path_buf(),
            reason,
        };

        if !(MIN_REPLAY_SPEED..=MAX_REPLAY_SPEED).contains(&self.replay_speed) {
            return Err(invalid(format!(
                "replay_speed must be between {MIN_REPLAY_SPEED} and {MAX_REPLAY_SPEED}, got {}",
                self.replay_speed
            )));
        }
        let minimum_distance = self.watch.minimum_distance_meters;
        if minimum_distance.is_nan() || minimum_distance < 0. {
            return Err(invalid(format!(
                "watch.minimum_distance_meters must not be negative, got {minimum_distance}"
            )));
        }
        Ok(())
    }
}
