pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod event;
pub mod gpx_util;
pub mod logging;
pub mod provider;
pub mod runtime;
pub mod ticker;

pub use controller::{SessionController, SessionStatus};
pub use error::TrackerError;
pub use runtime::SessionHandle;
