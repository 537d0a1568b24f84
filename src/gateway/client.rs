use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::{
    config::ApiConfig,
    domain::{JobStatus, Post, StatsSummary},
};

use super::{GatewayError, RemoteGateway};

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    instagram_url: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct HttpGateway {
    http: Client,
    base_url: Url,
    request_timeout: Duration,
}

impl HttpGateway {
    pub fn new(http: Client, config: &ApiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout,
        }
    }

    pub async fn check_health(&self) -> Result<HealthResponse, GatewayError> {
        let url = self.endpoint(&[""]);
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        decode_json("health", response).await
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        name: &str,
        segments: &[&str],
    ) -> Result<T, GatewayError> {
        let url = self.endpoint(segments);
        tracing::debug!(target: "gateway", endpoint = name, url = %url, "GET");
        let response = self
            .http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await?;
        decode_json(name, response).await
    }
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn submit_analysis(&self, profile_reference: &str) -> Result<Vec<Post>, GatewayError> {
        let url = self.endpoint(&["analyze", ""]);
        tracing::debug!(target: "gateway", endpoint = "analyze", url = %url, "POST");
        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .json(&AnalysisRequest {
                instagram_url: profile_reference,
            })
            .send()
            .await?;
        decode_json("analyze", response).await
    }

    async fn fetch_posts(&self, subject: &str) -> Result<Vec<Post>, GatewayError> {
        self.get_json("posts", &["posts", subject]).await
    }

    async fn fetch_stats(&self, subject: &str) -> Result<StatsSummary, GatewayError> {
        self.get_json("stats", &["stats", subject]).await
    }

    async fn fetch_job_status(&self, subject: &str) -> Result<JobStatus, GatewayError> {
        self.get_json("status", &["status", subject]).await
    }
}

async fn decode_json<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(GatewayError::Service {
            status: status.as_u16(),
            message: error_detail(status, &body),
        });
    }
    serde_json::from_str(&body).map_err(|source| GatewayError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .map(|detail| match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        });
    let text = detail.unwrap_or_else(|| body.trim().to_string());
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no details provided")
            .to_string()
    } else {
        text
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
