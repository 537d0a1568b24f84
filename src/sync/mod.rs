//! Keeps a subject's results in step with the analysis job.
//!
//! [`JobPoller`] watches the job; [`ResultSync`] owns the view state and
//! reloads it when the job finishes.

pub mod orchestrator;
pub mod poller;

pub use orchestrator::{ResultSync, SyncError};
pub use poller::{CompletionCallback, JobPoller, PollerState};
