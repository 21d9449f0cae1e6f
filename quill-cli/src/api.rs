//! Manage-API client.
//!
//! Thin reqwest wrapper over the manage API's project endpoints. All the
//! generator pipeline needs is the full project definition document and,
//! for `--all`, the project listing.

use quill_core::config::ApiConfig;
use quill_core::project::FullProjectDefinition;
use quill_core::{QuillError, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Envelope the manage API wraps every response body in.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

/// A project listing entry.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

pub struct ManageApiClient {
    http: reqwest::Client,
    base_url: String,
    tenant_id: String,
}

impl ManageApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuillError::api(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant_id: config.tenant_id.clone(),
        })
    }

    /// Fetch one full project definition, optionally pinned to a tag.
    pub async fn get_project(
        &self,
        project_id: &str,
        tag: Option<&str>,
    ) -> Result<FullProjectDefinition> {
        let mut url = format!(
            "{}/tenants/{}/projects/{}",
            self.base_url, self.tenant_id, project_id
        );
        if let Some(tag) = tag {
            url.push_str(&format!("?tag={}", tag));
        }
        debug!(url = %url, "Fetching project definition");

        let envelope: ApiEnvelope<FullProjectDefinition> =
            self.request_json(&url, "project", project_id).await?;
        Ok(envelope.data)
    }

    /// List all projects for the configured tenant.
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let url = format!("{}/tenants/{}/projects", self.base_url, self.tenant_id);
        debug!(url = %url, "Listing projects");

        let envelope: ApiEnvelope<Vec<ProjectSummary>> =
            self.request_json(&url, "project list", &self.tenant_id).await?;
        Ok(envelope.data)
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
        id: &str,
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| QuillError::api(format!("Failed to fetch {} '{}': {}", what, id, e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(QuillError::not_found(what, id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QuillError::api(format!(
                "Manage API returned {} for {} '{}': {}",
                status, what, id, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| QuillError::api(format!("Invalid {} response body: {}", what, e)))
    }
}
