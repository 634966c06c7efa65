//! Azure Client
//!
//! Main client for interacting with Azure Resource Manager, combining
//! authentication and HTTP functionality.

use super::auth::{AzureCredentials, CredentialSource};
use super::http::{ApiError, ApiResponse, AzureHttpClient};
use serde_json::Value;

/// Default Azure Resource Manager endpoint (public cloud)
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// API version of the `microsoft.insights/workbooks` resource provider
pub const WORKBOOKS_API_VERSION: &str = "2015-05-01";

/// Main Azure client
#[derive(Clone)]
pub struct AzureClient {
    pub credentials: AzureCredentials,
    pub http: AzureHttpClient,
    pub subscription_id: String,
    pub endpoint: String,
    pub api_version: String,
}

impl AzureClient {
    /// Create a new Azure client bound to one subscription
    pub fn new(
        subscription_id: &str,
        endpoint: &str,
        source: CredentialSource,
    ) -> Result<Self, ApiError> {
        let http = AzureHttpClient::new()?;
        let credentials = AzureCredentials::new(source)?;

        Ok(Self {
            credentials,
            http,
            subscription_id: subscription_id.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: WORKBOOKS_API_VERSION.to_string(),
        })
    }

    /// Override the API version sent with workbook requests
    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String, ApiError> {
        self.credentials.get_token().await
    }

    /// Make a GET request to an ARM URL
    pub async fn get(&self, url: &str) -> Result<ApiResponse, ApiError> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    /// Make a PUT request to an ARM URL
    pub async fn put(&self, url: &str, body: &Value) -> Result<ApiResponse, ApiError> {
        let token = self.get_token().await?;
        self.http.put(url, &token, body).await
    }

    /// Make a DELETE request to an ARM URL
    pub async fn delete(&self, url: &str) -> Result<ApiResponse, ApiError> {
        let token = self.get_token().await?;
        self.http.delete(url, &token).await
    }

    // =========================================================================
    // Resource Manager URL helpers
    // =========================================================================

    /// Build a resource group scoped URL
    pub fn resource_group_url(&self, resource_group: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}",
            self.endpoint,
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group)
        )
    }

    /// Build a provider resource URL without query string
    pub fn provider_url(&self, resource_group: &str, namespace: &str, path: &str) -> String {
        format!(
            "{}/providers/{}/{}",
            self.resource_group_url(resource_group),
            namespace,
            path
        )
    }

    /// Build the URL of a single workbook, including `api-version`
    pub fn workbook_url(&self, resource_group: &str, name: &str) -> String {
        format!(
            "{}?api-version={}",
            self.provider_url(
                resource_group,
                "microsoft.insights",
                &format!("workbooks/{}", urlencoding::encode(name))
            ),
            urlencoding::encode(&self.api_version)
        )
    }
}
