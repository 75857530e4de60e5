use std::time::Duration;

use chrono::{DateTime, Utc};
use pace_tracker_lib::{geodesy::distance_meters, Command, Fix, GeoPoint, SessionSnapshot, SessionState};

use crate::{
    display::{Notice, SnapshotSink},
    provider::{LocationProvider, WatchId, WatchOptions},
    ticker::{TickSource, TimerId},
};

/// Elapsed time advances by one second per tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What the display gets to see.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStatus {
    pub state: SessionState,
    pub fix_count: usize,
    pub snapshot: SessionSnapshot,
    pub started_at: Option<DateTime<Utc>>,
}

/// Accumulators of one start-to-stop interval.
#[derive(Debug)]
struct Session {
    started_at: DateTime<Utc>,
    fixes: Vec<Fix>,
    distance_meters: f64,
    elapsed_seconds: u64,
}

impl Session {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            fixes: Vec::new(),
            distance_meters: 0.,
            elapsed_seconds: 0,
        }
    }

    /// Appends the fix and returns the distance it added. Every fix is
    /// measured against the one right before it, jitter included.
    fn add_fix(&mut self, position: GeoPoint, received_at: DateTime<Utc>) -> f64 {
        let delta = self
            .fixes
            .last()
            .map_or(0., |previous| distance_meters(previous.position, position));

        self.fixes.push(Fix::new(self.fixes.len(), position, received_at));
        self.distance_meters += delta;
        delta
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.elapsed_seconds, self.distance_meters)
    }
}

/// Single owner of the session state. Fixes and ticks only count while
/// running and only when they come from the watch and timer the controller
/// currently holds.
pub struct SessionController<P, T, D> {
    provider: P,
    ticker: T,
    display: D,
    options: WatchOptions,
    state: SessionState,
    session: Option<Session>,
    watch: Option<WatchId>,
    timer: Option<TimerId>,
}

impl<P, T, D> SessionController<P, T, D>
where
    P: LocationProvider,
    T: TickSource,
    D: SnapshotSink,
{
    pub fn new(provider: P, ticker: T, display: D, options: WatchOptions) -> Self {
        Self {
            provider,
            ticker,
            display,
            options,
            state: SessionState::Idle,
            session: None,
            watch: None,
            timer: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.as_ref().map(Session::snapshot).unwrap_or_default()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state,
            fix_count: self.fixes().len(),
            snapshot: self.snapshot(),
            started_at: self.session.as_ref().map(|session| session.started_at),
        }
    }

    pub fn fixes(&self) -> &[Fix] {
        self.session
            .as_ref()
            .map(|session| session.fixes.as_slice())
            .unwrap_or_default()
    }

    pub fn active_watch(&self) -> Option<WatchId> {
        self.watch
    }

    pub fn active_timer(&self) -> Option<TimerId> {
        self.timer
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Stop => self.stop(),
        }
    }

    /// Begins a fresh session from any state, dropping whatever the previous
    /// one accumulated.
    pub fn start(&mut self) {
        self.detach();
        self.session = Some(Session::new(Utc::now()));
        self.state = SessionState::Running;
        self.attach();

        tracing::info!("Session started");
        self.publish();
    }

    pub fn pause(&mut self) {
        if !self.accepts(Command::Pause) {
            return;
        }
        self.detach();
        self.state = SessionState::Paused;

        tracing::info!("Session paused at {}", self.snapshot());
        self.publish();
    }

    pub fn resume(&mut self) {
        if !self.accepts(Command::Resume) {
            return;
        }
        self.state = SessionState::Running;
        self.attach();

        tracing::info!("Session resumed");
        self.publish();
    }

    /// Ends the session. The accumulated values stay visible until the next
    /// start.
    pub fn stop(&mut self) {
        if !self.accepts(Command::Stop) {
            return;
        }
        self.detach();
        self.state = SessionState::Stopped;

        tracing::info!("Session stopped at {}", self.snapshot());
        self.publish();
    }

    pub fn on_fix(&mut self, watch: WatchId, position: GeoPoint) {
        if !self.is_live_watch(watch) {
            tracing::debug!("Dropping fix from inactive {watch}");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let delta = session.add_fix(position, Utc::now());
        tracing::debug!(
            "Fix #{} at ({}, {}), +{delta:.2} m",
            session.fixes.len() - 1,
            position.latitude,
            position.longitude
        );
        self.publish();
    }

    /// Provider failures never end the session, they are only passed on to
    /// the display.
    pub fn on_provider_error(&mut self, watch: WatchId, message: &str) {
        if !self.is_live_watch(watch) {
            tracing::debug!("Dropping error from inactive {watch}: {message}");
            return;
        }
        tracing::warn!("Location provider error on {watch}: {message}");
        self.display.notice(&Notice::ProviderFailure(message.to_string()));
    }

    pub fn on_tick(&mut self, timer: TimerId) {
        if !self.state.is_running() || self.timer != Some(timer) {
            tracing::trace!("Dropping tick from inactive {timer}");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.elapsed_seconds += 1;
        self.publish();
    }

    /// Releases the watch and timer without touching the session state.
    pub fn shutdown(&mut self) {
        self.detach();
    }

    fn accepts(&self, command: Command) -> bool {
        let accepted = self.state.accepts(command);
        if !accepted {
            tracing::debug!("Ignoring {command} while {}", self.state);
        }
        accepted
    }

    fn is_live_watch(&self, watch: WatchId) -> bool {
        self.state.is_running() && self.watch == Some(watch)
    }

    fn attach(&mut self) {
        match self.provider.watch_position(&self.options) {
            Ok(watch) => {
                tracing::debug!("Subscribed to location updates as {watch}");
                self.watch = Some(watch);
            }
            Err(err) => {
                tracing::warn!("Failed to subscribe to location updates: {err}");
                self.display.notice(&Notice::WatchUnavailable(err.to_string()));
            }
        }
        self.timer = Some(self.ticker.arm(TICK_PERIOD));
    }

    fn detach(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.provider.clear_watch(watch);
        }
        if let Some(timer) = self.timer.take() {
            self.ticker.disarm(timer);
        }
    }

    fn publish(&mut self) {
        let status = self.status();
        self.display.render(&status);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::TrackerError;

    #[derive(Default)]
    struct FakeProvider {
        next_id: u64,
        live: HashSet<WatchId>,
        subscribed: usize,
        fail: bool,
    }

    impl LocationProvider for FakeProvider {
        fn watch_position(&mut self, _options: &WatchOptions) -> Result<WatchId, TrackerError> {
            if self.fail {
                return Err(TrackerError::Provider("permission denied".into()));
            }
            self.next_id += 1;
            self.subscribed += 1;
            let watch = WatchId(self.next_id);
            self.live.insert(watch);
            Ok(watch)
        }

        fn clear_watch(&mut self, watch: WatchId) {
            assert!(self.live.remove(&watch), "{watch} cleared twice");
        }
    }

    #[derive(Default)]
    struct FakeTicker {
        next_id: u64,
        armed: HashSet<TimerId>,
    }

    impl TickSource for FakeTicker {
        fn arm(&mut self, period: Duration) -> TimerId {
            assert_eq!(period, TICK_PERIOD);
            self.next_id += 1;
            let timer = TimerId(self.next_id);
            self.armed.insert(timer);
            timer
        }

        fn disarm(&mut self, timer: TimerId) {
            assert!(self.armed.remove(&timer), "{timer} disarmed twice");
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        rendered: Vec<SessionStatus>,
        notices: Vec<Notice>,
    }

    impl SnapshotSink for RecordingSink {
        fn render(&mut self, status: &SessionStatus) {
            self.rendered.push(status.clone());
        }

        fn notice(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    type TestController = SessionController<FakeProvider, FakeTicker, RecordingSink>;

    fn controller() -> TestController {
        SessionController::new(
            FakeProvider::default(),
            FakeTicker::default(),
            RecordingSink::default(),
            WatchOptions::default(),
        )
    }

    fn fix(c: &mut TestController, latitude: f64, longitude: f64) {
        let watch = c.active_watch().expect("no live watch");
        c.on_fix(watch, GeoPoint::new(latitude, longitude));
    }

    fn ticks(c: &mut TestController, count: usize) {
        let timer = c.active_timer().expect("no armed timer");
        for _ in 0..count {
            c.on_tick(timer);
        }
    }

    #[test]
    fn starts_idle_with_unset_accumulators() {
        let c = controller();
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.status(), SessionStatus::default());
        assert!(c.fixes().is_empty());
    }

    #[test]
    fn stop_while_idle_is_noop() {
        let mut c = controller();
        c.stop();
        c.pause();
        c.resume();
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.status(), SessionStatus::default());
        assert!(c.display().rendered.is_empty());
        assert_eq!(c.provider().subscribed, 0);
    }

    #[test]
    fn start_subscribes_and_arms() {
        let mut c = controller();
        c.start();
        assert_eq!(c.state(), SessionState::Running);
        assert_eq!(c.provider().live.len(), 1);
        assert_eq!(c.ticker().armed.len(), 1);
        assert!(c.status().started_at.is_some());
    }

    #[test]
    fn end_to_end_one_minute_over_one_hundred_metres() {
        let mut c = controller();
        c.start();
        fix(&mut c, 0., 0.);
        fix(&mut c, 0.001, 0.);
        ticks(&mut c, 60);

        let snapshot = c.snapshot();
        assert_eq!(snapshot.elapsed_display(), "1m 0s");
        assert_eq!(snapshot.distance_display(), "111.19 metres");
        assert!((snapshot.distance_meters - 111.195).abs() < 0.01);
        assert_eq!(snapshot.pace_display(), "8.99 min/km");
    }

    #[test]
    fn first_fix_adds_no_distance() {
        let mut c = controller();
        c.start();
        fix(&mut c, 10., 10.);
        assert_eq!(c.fixes().len(), 1);
        assert_eq!(c.snapshot().distance_meters, 0.);
        assert_eq!(c.snapshot().pace_min_per_km, None);
    }

    #[test]
    fn repeated_fix_is_kept_and_adds_zero() {
        let mut c = controller();
        c.start();
        fix(&mut c, 1., 1.);
        fix(&mut c, 1., 1.);
        assert_eq!(c.fixes().len(), 2);
        assert_eq!(c.snapshot().distance_meters, 0.);
    }

    #[test]
    fn fixes_are_tagged_in_arrival_order() {
        let mut c = controller();
        c.start();
        fix(&mut c, 0., 0.);
        fix(&mut c, 0., 0.001);
        fix(&mut c, 0., 0.002);
        let sequences: Vec<_> = c.fixes().iter().map(|f| f.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn jitter_accumulates_verbatim() {
        let mut c = controller();
        c.start();
        for i in 0..10 {
            let wobble = if i % 2 == 0 { 0. } else { 0.0001 };
            fix(&mut c, wobble, 0.);
        }
        let leg = distance_meters(GeoPoint::new(0., 0.), GeoPoint::new(0.0001, 0.));
        assert!((c.snapshot().distance_meters - 9. * leg).abs() < 1e-9);
    }

    #[test]
    fn start_resets_from_every_state() {
        let setups: [fn(&mut TestController); 3] = [
            |_| {},
            |c| c.pause(),
            |c| c.stop(),
        ];
        for setup in setups {
            let mut c = controller();
            c.start();
            fix(&mut c, 0., 0.);
            fix(&mut c, 0.01, 0.);
            ticks(&mut c, 5);
            setup(&mut c);

            c.start();
            assert_eq!(c.state(), SessionState::Running);
            assert_eq!(c.snapshot(), SessionSnapshot::new(0, 0.));
            assert!(c.fixes().is_empty());
            assert_eq!(c.provider().live.len(), 1);
            assert_eq!(c.ticker().armed.len(), 1);
        }
    }

    #[test]
    fn restart_while_running_drops_old_subscription() {
        let mut c = controller();
        c.start();
        let old_watch = c.active_watch().unwrap();
        let old_timer = c.active_timer().unwrap();

        c.start();
        c.on_fix(old_watch, GeoPoint::new(0., 0.));
        c.on_tick(old_timer);

        assert!(c.fixes().is_empty());
        assert_eq!(c.snapshot().elapsed_seconds, 0);
    }

    #[test]
    fn pause_detaches_and_freezes() {
        let mut c = controller();
        c.start();
        fix(&mut c, 0., 0.);
        fix(&mut c, 0.001, 0.);
        ticks(&mut c, 3);
        let watch = c.active_watch().unwrap();
        let timer = c.active_timer().unwrap();
        let before = c.snapshot();

        c.pause();
        assert_eq!(c.state(), SessionState::Paused);
        assert!(c.provider().live.is_empty());
        assert!(c.ticker().armed.is_empty());

        c.on_fix(watch, GeoPoint::new(1., 1.));
        c.on_tick(timer);
        assert_eq!(c.snapshot(), before);
        assert_eq!(c.fixes().len(), 2);
    }

    #[test]
    fn fix_while_paused_is_discarded_not_queued() {
        let mut c = controller();
        c.start();
        let watch = c.active_watch().unwrap();
        c.pause();
        c.on_fix(watch, GeoPoint::new(1., 1.));
        c.resume();

        assert_eq!(c.snapshot().distance_meters, 0.);
        assert!(c.fixes().is_empty());
    }

    #[test]
    fn pause_resume_gives_same_distance_as_uninterrupted() {
        let route = [(0., 0.), (0.001, 0.), (0.002, 0.001), (0.003, 0.001)];

        let mut straight = controller();
        straight.start();
        for (lat, lon) in route {
            fix(&mut straight, lat, lon);
        }

        let mut interrupted = controller();
        interrupted.start();
        for (i, (lat, lon)) in route.into_iter().enumerate() {
            if i == 2 {
                interrupted.pause();
                interrupted.resume();
            }
            fix(&mut interrupted, lat, lon);
        }

        assert_eq!(
            straight.snapshot().distance_meters,
            interrupted.snapshot().distance_meters
        );
    }

    #[test]
    fn rapid_pause_resume_keeps_single_timer() {
        let mut c = controller();
        c.start();
        for _ in 0..20 {
            c.pause();
            c.resume();
            c.resume();
        }
        assert_eq!(c.ticker().armed.len(), 1);
        assert_eq!(c.provider().live.len(), 1);
        assert_eq!(c.provider().subscribed, 21);
    }

    #[test]
    fn stop_retains_values_until_next_start() {
        let mut c = controller();
        c.start();
        fix(&mut c, 0., 0.);
        fix(&mut c, 0.001, 0.);
        ticks(&mut c, 60);
        let watch = c.active_watch().unwrap();

        c.stop();
        assert_eq!(c.state(), SessionState::Stopped);
        assert!(c.provider().live.is_empty());
        assert!(c.ticker().armed.is_empty());

        c.on_fix(watch, GeoPoint::new(5., 5.));
        c.resume();
        c.pause();
        assert_eq!(c.state(), SessionState::Stopped);
        assert_eq!(c.snapshot().elapsed_seconds, 60);
        assert_eq!(c.fixes().len(), 2);
    }

    #[test]
    fn stop_from_paused() {
        let mut c = controller();
        c.start();
        c.pause();
        c.stop();
        assert_eq!(c.state(), SessionState::Stopped);
    }

    #[test]
    fn pace_undefined_with_time_but_no_distance() {
        let mut c = controller();
        c.start();
        ticks(&mut c, 120);
        assert_eq!(c.snapshot().elapsed_seconds, 120);
        assert_eq!(c.snapshot().pace_min_per_km, None);
    }

    #[test]
    fn provider_error_is_a_notice() {
        let mut c = controller();
        c.start();
        fix(&mut c, 0., 0.);
        let watch = c.active_watch().unwrap();
        c.on_provider_error(watch, "signal lost");

        assert_eq!(c.state(), SessionState::Running);
        assert_eq!(c.fixes().len(), 1);
        assert_eq!(c.display().notices, vec![Notice::ProviderFailure("signal lost".into())]);
    }

    #[test]
    fn stale_provider_error_is_ignored() {
        let mut c = controller();
        c.start();
        let watch = c.active_watch().unwrap();
        c.pause();
        c.on_provider_error(watch, "late");
        assert!(c.display().notices.is_empty());
    }

    #[test]
    fn failed_subscription_keeps_clock_running() {
        let mut c = SessionController::new(
            FakeProvider {
                fail: true,
                ..Default::default()
            },
            FakeTicker::default(),
            RecordingSink::default(),
            WatchOptions::default(),
        );
        c.start();

        assert_eq!(c.state(), SessionState::Running);
        assert_eq!(c.active_watch(), None);
        assert!(matches!(c.display().notices[..], [Notice::WatchUnavailable(_)]));

        ticks(&mut c, 2);
        assert_eq!(c.snapshot().elapsed_seconds, 2);
    }

    #[test]
    fn every_change_is_rendered() {
        let mut c = controller();
        c.start();
        fix(&mut c, 0., 0.);
        ticks(&mut c, 2);
        c.pause();

        let states: Vec<_> = c.display().rendered.iter().map(|s| s.state).collect();
        assert_eq!(
            states,
            vec![
                SessionState::Running,
                SessionState::Running,
                SessionState::Running,
                SessionState::Running,
                SessionState::Paused,
            ]
        );
        assert_eq!(c.display().rendered.last().unwrap().snapshot.elapsed_seconds, 2);
    }

    #[test]
    fn shutdown_releases_collaborators() {
        let mut c = controller();
        c.start();
        c.shutdown();
        assert!(c.provider().live.is_empty());
        assert!(c.ticker().armed.is_empty());
    }
}
