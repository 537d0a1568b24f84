mod client;
pub mod error;

use async_trait::async_trait;

use crate::domain::{JobStatus, Post, StatsSummary};

pub use client::HttpGateway;
pub use error::GatewayError;

/// Request/response operations offered by the analysis service.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Starts (or reuses) a server-side analysis job and returns its first page.
    async fn submit_analysis(&self, profile_reference: &str) -> Result<Vec<Post>, GatewayError>;

    async fn fetch_posts(&self, subject: &str) -> Result<Vec<Post>, GatewayError>;

    async fn fetch_stats(&self, subject: &str) -> Result<StatsSummary, GatewayError>;

    async fn fetch_job_status(&self, subject: &str) -> Result<JobStatus, GatewayError>;
}
