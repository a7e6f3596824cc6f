pub mod detector;
pub mod resolution;

pub use detector::{detect_conflicts, ConflictKind, SyncConflict};
pub use resolution::ConflictResolution;
