use std::path::Path;

use geo_types::Point;
use gpx::Waypoint;
use pace_tracker_lib::GeoPoint;

use crate::TrackerError;

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub title: String,
    pub points: Vec<GeoPoint>,
}

/// Collects every track point of a GPX file, segments concatenated in file
/// order. Files without tracks fall back to their routes.
pub fn read_gpx(path: &Path) -> Result<Route, TrackerError> {
    let gpx_error = |reason: String| TrackerError::Gpx {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|err| gpx_error(err.to_string()))?;
    let reader = std::io::BufReader::new(file);
    let gpx = gpx::read(reader).map_err(|err| gpx_error(err.to_string()))?;

    let mut title = "Unnamed".to_string();
    if let Some(name) = gpx.metadata.and_then(|meta| meta.name) {
        title = name;
    }

    let mut points: Vec<GeoPoint> = gpx
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .map(to_geo_point)
        .collect();

    if points.is_empty() {
        points = gpx
            .routes
            .iter()
            .flat_map(|route| route.points.iter())
            .map(to_geo_point)
            .collect();
    }

    Ok(Route { title, points })
}

fn to_geo_point(waypoint: &Waypoint) -> GeoPoint {
    let point: Point<f64> = waypoint.point();
    point.into()
}
