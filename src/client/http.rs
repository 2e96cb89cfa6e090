//! reqwest-backed client for the MalDetect server.

use super::dashboard::{DashboardStats, HealthStatus};
use super::response::{classify_bulk_reply, classify_single_reply, SingleScanReport};
use super::{ScanClient, BULK_SCAN_PATH, DASHBOARD_STATS_PATH, HEALTH_PATH, SCAN_PATH};
use crate::core::config::ServerConfig;
use crate::core::error::{Error, Result, ScanFailure};
use crate::core::types::{Algorithm, ScanOutcome, UploadItem};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// HTTP client for the scanning server.
pub struct HttpScanClient {
    /// Base URL without trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl HttpScanClient {
    /// Create a new client from server settings.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("maldetect/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build the multipart body: the file bytes plus an optional `algo` field.
    async fn upload_form(
        name: &str,
        path: &Path,
        algorithm: Option<Algorithm>,
    ) -> std::result::Result<Form, ScanFailure> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ScanFailure::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(name.to_string()));
        if let Some(algo) = algorithm {
            form = form.text("algo", algo.as_str());
        }
        Ok(form)
    }

    /// POST a multipart form and return the status and raw body.
    async fn post_form(
        &self,
        path: &str,
        form: Form,
    ) -> std::result::Result<(u16, String), ScanFailure> {
        let response = self.client.post(self.url(path)).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Scan one file through the single-file endpoint.
    pub async fn scan_file(
        &self,
        path: &Path,
        algorithm: Option<Algorithm>,
    ) -> Result<SingleScanReport> {
        let item = UploadItem::from_path(path).map_err(|e| Error::file_read(path, e))?;
        log::debug!("Uploading {} ({} bytes) to {}", item.name, item.size, SCAN_PATH);

        let form = Self::upload_form(&item.name, &item.path, algorithm).await?;
        let (status, body) = self.post_form(SCAN_PATH, form).await?;
        Ok(classify_single_reply(status, &body)?)
    }

    /// Check that the server is up.
    pub async fn health(&self) -> Result<HealthStatus> {
        let response = self.client.get(self.url(HEALTH_PATH)).send().await?;
        if !response.status().is_success() {
            return Err(ScanFailure::Transport {
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(response.json::<HealthStatus>().await?)
    }

    /// Fetch aggregate statistics for the dashboard.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let response = self.client.get(self.url(DASHBOARD_STATS_PATH)).send().await?;
        if !response.status().is_success() {
            return Err(ScanFailure::Transport {
                status: response.status().as_u16(),
            }
            .into());
        }
        Ok(response.json::<DashboardStats>().await?)
    }
}

#[async_trait]
impl ScanClient for HttpScanClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn scan_one(
        &self,
        item: &UploadItem,
        algorithm: Option<Algorithm>,
    ) -> std::result::Result<ScanOutcome, ScanFailure> {
        let form = Self::upload_form(&item.name, &item.path, algorithm).await?;
        let (status, body) = self.post_form(BULK_SCAN_PATH, form).await?;
        log::trace!("{} -> HTTP {} ({} bytes)", item.name, status, body.len());
        classify_bulk_reply(status, &body, item)
    }
}
