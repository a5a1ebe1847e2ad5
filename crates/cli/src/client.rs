//! API client for a running dockwise agent

use advisor_lib::analysis::{ContainerTemplate, TemplateMatch};
use advisor_lib::history::{HistoryLog, HistoryTrend};
use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Non-success response from the agent
#[derive(Debug, thiserror::Error)]
#[error("API error ({status}): {body}")]
pub struct ApiError {
    pub status: StatusCode,
    pub body: String,
}

/// HTTP client for the agent API
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// GET `path` with optional query pairs
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, ?query, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    /// POST to `path` without a body
    pub async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError { status, body }.into());
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

/// Body of `GET /api/v1/templates`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplatesView {
    pub templates: Vec<ContainerTemplate>,
    pub matched: Vec<TemplateMatch>,
}

/// Body of `GET /api/v1/history`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub log: HistoryLog,
    pub trend: Option<HistoryTrend>,
}

impl HistoryView {
    pub fn new(log: HistoryLog) -> Self {
        let trend = log.trend();
        Self { log, trend }
    }
}
