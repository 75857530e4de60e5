use std::{fs::OpenOptions, path::Path};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::TrackerError;

pub const LOG_FILE_NAME: &str = "tracker.log";

/// Logs to stderr and appends a plain copy to `<log_dir>/tracker.log`.
/// Stdout is left to the display.
pub fn init(log_dir: &Path) -> Result<(), TrackerError> {
    std::fs::create_dir_all(log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE_NAME))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("{}=debug,pace_tracker=debug", env!("CARGO_CRATE_NAME")).into())
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(file))
        .init();

    Ok(())
}
