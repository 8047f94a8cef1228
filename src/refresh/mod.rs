//! Refresh state: snapshots, staleness, and single-flight coordination

mod coordinator;
mod snapshot;

pub use coordinator::{RefreshCoordinator, TrackerView};
pub use snapshot::Snapshot;
