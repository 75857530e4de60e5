use std::{fmt, io::Write};

use crate::controller::SessionStatus;

/// Something worth telling the user that does not end the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The provider reported a failure for the live watch.
    ProviderFailure(String),
    /// Subscribing to the provider failed, the session runs without fixes.
    WatchUnavailable(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ProviderFailure(message) => write!(f, "location provider error: {message}"),
            Notice::WatchUnavailable(message) => write!(f, "location unavailable: {message}"),
        }
    }
}

/// Consumer of everything the session wants shown.
pub trait SnapshotSink {
    /// Called after every state change and every accumulator change.
    fn render(&mut self, status: &SessionStatus);

    fn notice(&mut self, notice: &Notice);
}

pub fn format_status(status: &SessionStatus) -> String {
    let controls = status
        .state
        .available_commands()
        .iter()
        .map(|command| command.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "[{}] Time: {} | Distance: {} | Pace: {} | fixes: {} | controls: {}",
        status.state,
        status.snapshot.elapsed_display(),
        status.snapshot.distance_display(),
        status.snapshot.pace_display(),
        status.fix_count,
        controls,
    )
}

/// Writes one line per update.
pub struct ConsoleDisplay<W: Write> {
    out: W,
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(err) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            tracing::warn!("Failed to write to display: {err}");
        }
    }
}

impl<W: Write> SnapshotSink for ConsoleDisplay<W> {
    fn render(&mut self, status: &SessionStatus) {
        let line = format_status(status);
        self.write_line(&line);
    }

    fn notice(&mut self, notice: &Notice) {
        let line = format!("! {notice}");
        self.write_line(&line);
    }
}
