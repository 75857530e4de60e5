use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use pace_tracker_lib::{
    geodesy::{distance_meters, path_length_meters},
    GeoPoint,
};
use tokio::task::JoinHandle;

use crate::{
    event::{EventSender, SessionEvent},
    TrackerError,
};

use super::{LocationProvider, WatchId, WatchOptions};

/// Position along the replayed route. Shared between watches so a resumed
/// watch continues where the previous one stopped.
#[derive(Debug, Default)]
pub struct ReplayCursor {
    index: usize,
    last_delivered: Option<GeoPoint>,
}

impl ReplayCursor {
    /// Next route point at least `minimum_distance_meters` away from the last
    /// delivered one, or `None` once the route is used up.
    pub fn advance(&mut self, route: &[GeoPoint], minimum_distance_meters: f64) -> Option<GeoPoint> {
        while let Some(point) = route.get(self.index).copied() {
            self.index += 1;

            let far_enough = self
                .last_delivered
                .map_or(true, |last| distance_meters(last, point) >= minimum_distance_meters);

            if far_enough {
                self.last_delivered = Some(point);
                return Some(point);
            }
        }
        None
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// Plays a recorded route back as if it came from a live receiver, one fix
/// per `minimum_interval_ms` divided by the replay speed.
pub struct GpxReplayProvider {
    route: Arc<Vec<GeoPoint>>,
    cursor: Arc<Mutex<ReplayCursor>>,
    speed: f64,
    events: EventSender,
    next_id: u64,
    watches: HashMap<WatchId, JoinHandle<()>>,
}

impl GpxReplayProvider {
    pub fn new(route: Vec<GeoPoint>, speed: f64, events: EventSender) -> Self {
        Self {
            route: Arc::new(route),
            cursor: Arc::new(Mutex::new(ReplayCursor::default())),
            speed,
            events,
            next_id: 0,
            watches: HashMap::new(),
        }
    }

    pub fn active_watches(&self) -> usize {
        self.watches.len()
    }

    pub fn route_length_meters(&self) -> f64 {
        path_length_meters(&self.route)
    }

    fn fix_period(&self, options: &WatchOptions) -> Result<Duration, TrackerError> {
        let seconds = options.minimum_interval_ms as f64 / 1000. / self.speed;
        let period = Duration::try_from_secs_f64(seconds).map_err(|err| {
            TrackerError::Provider(format!("replay speed {} gives no usable fix interval: {err}", self.speed))
        })?;
        Ok(period.max(Duration::from_millis(1)))
    }
}

impl LocationProvider for GpxReplayProvider {
    fn watch_position(&mut self, options: &WatchOptions) -> Result<WatchId, TrackerError> {
        if self.route.is_empty() {
            return Err(TrackerError::Provider("route has no points".into()));
        }
        if !(self.speed.is_finite() && self.speed > 0.) {
            return Err(TrackerError::Provider(format!("invalid replay speed {}", self.speed)));
        }

        let period = self.fix_period(options)?;
        self.next_id += 1;
        let watch = WatchId(self.next_id);
        let minimum_distance = options.minimum_distance_meters;
        let route = self.route.clone();
        let cursor = self.cursor.clone();
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;

                let next = {
                    let mut cursor = cursor.lock().unwrap_or_else(|poisoned| {
                        tracing::warn!("Replay cursor was poisoned, continuing from its last position");
                        poisoned.into_inner()
                    });
                    cursor.advance(&route, minimum_distance)
                };

                let event = match next {
                    Some(position) => SessionEvent::Fix { watch, position },
                    None => {
                        let _ = events.send(SessionEvent::ProviderError {
                            watch,
                            message: "route exhausted".into(),
                        });
                        break;
                    }
                };

                if events.send(event).is_err() {
                    break;
                }
            }
        });

        tracing::debug!("Replay {watch} started, one fix every {period:?}");
        self.watches.insert(watch, task);
        Ok(watch)
    }

    fn clear_watch(&mut self, watch: WatchId) {
        if let Some(task) = self.watches.remove(&watch) {
            task.abort();
            tracing::debug!("Replay {watch} cleared");
        }
    }
}

impl Drop for GpxReplayProvider {
    fn drop(&mut self) {
        for (_, task) in self.watches.drain() {
            task.abort();
        }
    }
}
