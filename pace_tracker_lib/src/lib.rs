pub mod geo_point;
pub mod geodesy;
pub mod session_state;
pub mod snapshot;

pub use geo_point::{Fix, GeoPoint};
pub use session_state::{Command, SessionState};
pub use snapshot::SessionSnapshot;
