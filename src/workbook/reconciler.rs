//! Reconciler
//!
//! Turns a [`DesiredState`] into a single create-or-update call and returns
//! the identity the remote assigned.

use super::error::{WorkbookError, WorkbookResult};
use super::guard::ExistenceGuard;
use super::hidden_link;
use super::model::{DesiredState, Workbook, WorkbookProperties};
use super::remote::RemoteClient;
use crate::azure::ApiError;
use std::collections::BTreeMap;

pub struct Reconciler<C> {
    client: C,
    guard: ExistenceGuard<C>,
}

impl<C: RemoteClient + Clone> Reconciler<C> {
    pub fn new(client: C) -> Self {
        Self {
            guard: ExistenceGuard::new(client.clone()),
            client,
        }
    }

    /// Drive the remote workbook toward `desired`
    ///
    /// `existing` is the identity from a previous successful reconcile, if
    /// any. Without one the existence guard runs first.
    pub async fn reconcile(
        &self,
        desired: &DesiredState,
        existing: Option<&str>,
    ) -> WorkbookResult<String> {
        let name = desired.name.as_str();
        let resource_group = desired.resource_group.as_str();

        match existing {
            None => {
                self.guard.check_not_exists(resource_group, name).await?;
                tracing::info!(
                    "Creating Application Insights Workbook {:?} (Resource Group {:?})",
                    name,
                    resource_group
                );
            }
            Some(identity) => {
                tracing::info!("Updating Application Insights Workbook {:?}", identity);
            }
        }

        let link_key = hidden_link::encode(
            &desired.parent_resource_id,
            resource_group,
            self.client.subscription_id(),
        )?;
        let tags = hidden_link::merge(&desired.tags, link_key);
        let payload = build_payload(desired, tags);

        let remote_error = |source| WorkbookError::Remote {
            name: name.to_string(),
            resource_group: resource_group.to_string(),
            source,
        };

        let response = self
            .client
            .create_or_update(resource_group, name, &payload)
            .await
            .map_err(remote_error)?;

        let identity = response
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| remote_error(ApiError::Incomplete("id")))?;

        if let Some(previous) = existing {
            if previous != identity {
                tracing::warn!(
                    "Remote returned identity {:?}, previously tracked as {:?}",
                    identity,
                    previous
                );
            }
        }

        Ok(identity)
    }
}

/// Build the write payload for `desired` with an already merged tag map
pub fn build_payload(desired: &DesiredState, tags: BTreeMap<String, String>) -> Workbook {
    let kind = desired.kind.map(|k| k.as_str().to_string());

    Workbook {
        id: None,
        name: Some(desired.name.clone()),
        location: Some(desired.location.clone()),
        kind: kind.clone(),
        tags: Some(tags),
        properties: Some(WorkbookProperties {
            name: Some(desired.name.clone()),
            serialized_data: Some(desired.serialized_data.clone()),
            version: desired.version.clone(),
            workbook_id: Some(desired.workbook_id.to_string()),
            kind,
            time_modified: None,
            category: Some(desired.category.clone()),
            tags: Some(desired.labels.clone()),
            user_id: Some(desired.user_id.to_string()),
            source_resource_id: desired.source_resource_id.clone(),
        }),
    }
}
