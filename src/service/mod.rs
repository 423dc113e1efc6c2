mod error;
mod scheduler;
mod shared;
mod types;

pub use scheduler::SkyService;
pub use shared::SkyQuery;
pub use types::{ServiceStatus, VisibleSummary};
