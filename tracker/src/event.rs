use pace_tracker_lib::{Command, GeoPoint};
use tokio::sync::mpsc;

use crate::{provider::WatchId, ticker::TimerId};

/// Everything the session reacts to, in the order it was produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Command(Command),
    Fix { watch: WatchId, position: GeoPoint },
    ProviderError { watch: WatchId, message: String },
    Tick(TimerId),
    Shutdown,
}

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
