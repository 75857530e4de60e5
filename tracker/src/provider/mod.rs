use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TrackerError;

pub mod gpx_replay;

pub use gpx_replay::GpxReplayProvider;

/// Identifies one subscription to a location provider. Every call to
/// `watch_position` hands out a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    pub enable_high_accuracy: bool,
    /// Fixes closer than this to the previously delivered one are held back
    /// by the provider.
    pub minimum_distance_meters: f64,
    pub minimum_interval_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            minimum_distance_meters: 10.,
            minimum_interval_ms: 5000,
        }
    }
}

/// Source of position fixes. Implementations deliver
/// `SessionEvent::Fix` and `SessionEvent::ProviderError` tagged with the
/// watch id until the watch is cleared.
pub trait LocationProvider {
    fn watch_position(&mut self, options: &WatchOptions) -> Result<WatchId, TrackerError>;

    fn clear_watch(&mut self, watch: WatchId);
}
