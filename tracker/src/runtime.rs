use pace_tracker_lib::Command;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    controller::{SessionController, SessionStatus},
    display::SnapshotSink,
    event::{EventReceiver, EventSender, SessionEvent},
    provider::LocationProvider,
    ticker::TickSource,
    TrackerError,
};

/// Command surface and status accessor of a running session task.
#[derive(Clone)]
pub struct SessionHandle {
    events: EventSender,
    status: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    pub fn start(&self) {
        self.command(Command::Start);
    }

    pub fn pause(&self) {
        self.command(Command::Pause);
    }

    pub fn resume(&self) {
        self.command(Command::Resume);
    }

    pub fn stop(&self) {
        self.command(Command::Stop);
    }

    /// Queues the command behind every event already delivered. Never blocks.
    pub fn command(&self, command: Command) {
        if self.events.send(SessionEvent::Command(command)).is_err() {
            tracing::warn!("Session task is gone, dropping {command}");
        }
    }

    /// Latest published status. Elapsed time and distance always come from
    /// the same point in the event order.
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Waits for the next published status.
    pub async fn changed(&mut self) -> Result<SessionStatus, TrackerError> {
        self.status
            .changed()
            .await
            .map_err(|_| TrackerError::ChannelClosed)?;
        Ok(self.status.borrow_and_update().clone())
    }

    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    pub fn shutdown(&self) {
        if self.events.send(SessionEvent::Shutdown).is_err() {
            tracing::warn!("Session task is already gone");
        }
    }
}

/// Moves the controller into its own task. All events, whether commands,
/// fixes or ticks, go through the one queue and are handled in order.
/// The task hands the controller back once it has shut down.
pub fn spawn<P, T, D>(
    controller: SessionController<P, T, D>,
    events: EventSender,
    receiver: EventReceiver,
) -> (SessionHandle, JoinHandle<SessionController<P, T, D>>)
where
    P: LocationProvider + Send + 'static,
    T: TickSource + Send + 'static,
    D: SnapshotSink + Send + 'static,
{
    let (status_tx, status_rx) = watch::channel(controller.status());
    let task = tokio::spawn(run(controller, receiver, status_tx));

    let handle = SessionHandle {
        events,
        status: status_rx,
    };
    (handle, task)
}

async fn run<P, T, D>(
    mut controller: SessionController<P, T, D>,
    mut events: EventReceiver,
    status: watch::Sender<SessionStatus>,
) -> SessionController<P, T, D>
where
    P: LocationProvider,
    T: TickSource,
    D: SnapshotSink,
{
    tracing::debug!("Session task running");

    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Command(command) => controller.handle_command(command),
            SessionEvent::Fix { watch, position } => controller.on_fix(watch, position),
            SessionEvent::ProviderError { watch, message } => controller.on_provider_error(watch, &message),
            SessionEvent::Tick(timer) => controller.on_tick(timer),
            SessionEvent::Shutdown => break,
        }

        let current = controller.status();
        status.send_if_modified(|published| {
            if *published == current {
                return false;
            }
            *published = current;
            true
        });
    }

    controller.shutdown();
    tracing::debug!("Session task finished");
    controller
}
