mod precomputer;
mod types;

pub use precomputer::Precomputer;
pub use types::{PrecomputedTrack, TrajectorySample, VisibilitySnapshot};
