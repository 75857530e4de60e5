use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("location provider: {0}")]
    Provider(String),
    #[error("failed to read GPX route {path:?}: {reason}")]
    Gpx { path: PathBuf, reason: String },
    #[error("invalid configuration {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("session runtime has shut down")]
    ChannelClosed,
}
