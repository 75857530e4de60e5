use chrono::{DateTime, Utc};
use geo_types::Point;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A position in degrees. Values are trusted as delivered by the provider,
/// nothing is range checked.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<GeoPoint> for Point<f64> {
    fn from(point: GeoPoint) -> Self {
        Point::new(point.longitude, point.latitude)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// A position accepted into a session, tagged with its arrival order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub sequence: usize,
    pub position: GeoPoint,
    pub received_at: DateTime<Utc>,
}

impl Fix {
    pub fn new(sequence: usize, position: GeoPoint, received_at: DateTime<Utc>) -> Self {
        Self {
            sequence,
            position,
            received_at,
        }
    }
}
