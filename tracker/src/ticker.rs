use std::{collections::HashMap, fmt, time::Duration};

use tokio::{task::JoinHandle, time::{interval_at, Instant}};

use crate::event::{EventSender, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Periodic clock the session counts elapsed time with.
pub trait TickSource {
    /// Starts a timer delivering `SessionEvent::Tick` once per `period`,
    /// the first one a full period after arming.
    fn arm(&mut self, period: Duration) -> TimerId;

    fn disarm(&mut self, timer: TimerId);
}

/// Tokio backed ticker, one task per armed timer.
pub struct IntervalTicker {
    events: EventSender,
    next_id: u64,
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl IntervalTicker {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            next_id: 0,
            timers: HashMap::new(),
        }
    }

    pub fn armed_count(&self) -> usize {
        self.timers.len()
    }
}

impl TickSource for IntervalTicker {
    fn arm(&mut self, period: Duration) -> TimerId {
        self.next_id += 1;
        let timer = TimerId(self.next_id);
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if events.send(SessionEvent::Tick(timer)).is_err() {
                    break;
                }
            }
        });

        tracing::trace!("Armed {timer} every {period:?}");
        self.timers.insert(timer, task);
        timer
    }

    fn disarm(&mut self, timer: TimerId) {
        if let Some(task) = self.timers.remove(&timer) {
            task.abort();
            tracing::trace!("Disarmed {timer}");
        }
    }
}

impl Drop for IntervalTicker {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}
