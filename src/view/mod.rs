//! Presentation-side projections over a subject's posts.
//!
//! Everything here is synchronous and allocation-only so it can run on every
//! selection change without touching the network.

pub mod categories;
pub mod filter;
pub mod state;

pub use categories::category_index;
pub use filter::{filter_posts, CategorySelection};
pub use state::{SyncPhase, ViewState};
