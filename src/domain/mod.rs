pub mod post;
pub mod types;

pub use post::{MediaKind, Post};
pub use types::{CategoryCount, JobState, JobStatus, StatsSummary};
