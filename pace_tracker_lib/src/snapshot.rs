use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shown in place of the pace while it is undefined.
pub const PACE_PLACEHOLDER: &str = "--";

/// Derived view of a session. Only `elapsed_seconds` and `distance_meters`
/// are accumulated, the pace is always recomputed from them.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionSnapshot {
    pub elapsed_seconds: u64,
    pub distance_meters: f64,
    pub pace_min_per_km: Option<f64>,
}

impl SessionSnapshot {
    /// Snapshot of a session that has started.
    pub fn new(elapsed_seconds: u64, distance_meters: f64) -> Self {
        Self {
            elapsed_seconds,
            distance_meters,
            pace_min_per_km: average_pace(elapsed_seconds, distance_meters),
        }
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }

    pub fn distance_display(&self) -> String {
        format_distance(self.distance_meters)
    }

    pub fn pace_display(&self) -> String {
        format_pace(self.pace_min_per_km)
    }
}

/// Average pace since the session started, in minutes per kilometer.
/// Undefined while no distance has been covered.
pub fn average_pace(elapsed_seconds: u64, distance_meters: f64) -> Option<f64> {
    if distance_meters == 0. {
        return None;
    }
    let minutes = elapsed_seconds as f64 / 60.;
    Some(minutes / (distance_meters / 1000.))
}

pub fn format_elapsed(elapsed_seconds: u64) -> String {
    format!("{}m {}s", elapsed_seconds / 60, elapsed_seconds % 60)
}

pub fn format_distance(distance_meters: f64) -> String {
    format!("{:.2} metres", distance_meters)
}

pub fn format_pace(pace: Option<f64>) -> String {
    match pace {
        Some(pace) => format!("{:.2} min/km", pace),
        None => format!("{PACE_PLACEHOLDER} min/km"),
    }
}

impl fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time {} | distance {} | pace {}",
            self.elapsed_display(),
            self.distance_display(),
            self.pace_display()
        )
    }
}
