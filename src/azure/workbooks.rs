//! Azure Workbooks
//!
//! `RemoteClient` implementation over the `microsoft.insights/workbooks`
//! REST endpoints.

use super::client::AzureClient;
use super::http::ApiError;
use crate::workbook::{Lookup, RemoteClient, Workbook};
use reqwest::StatusCode;

impl RemoteClient for AzureClient {
    fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    async fn get_by_name(&self, resource_group: &str, name: &str) -> Result<Lookup, ApiError> {
        let url = self.workbook_url(resource_group, name);
        let response = self.get(&url).await?;

        if response.status == StatusCode::NOT_FOUND {
            return Ok(Lookup::NotFound);
        }

        let body = response.error_for_status()?;
        if body.is_null() {
            return Err(ApiError::Incomplete("body"));
        }
        let workbook: Workbook = serde_json::from_value(body)?;
        Ok(Lookup::Found(Box::new(workbook)))
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        workbook: &Workbook,
    ) -> Result<Workbook, ApiError> {
        let url = self.workbook_url(resource_group, name);
        let body = serde_json::to_value(workbook)?;

        let response = self.put(&url, &body).await?;
        let body = response.error_for_status()?;
        if body.is_null() {
            return Err(ApiError::Incomplete("body"));
        }

        Ok(serde_json::from_value(body)?)
    }

    async fn delete_by_name(&self, resource_group: &str, name: &str) -> Result<StatusCode, ApiError> {
        let url = self.workbook_url(resource_group, name);
        let response = self.delete(&url).await?;

        let status = response.status;
        if status == StatusCode::NOT_FOUND {
            return Ok(status);
        }
        response.error_for_status()?;
        Ok(status)
    }
}
