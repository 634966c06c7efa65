//! Reader
//!
//! Fetches a workbook and normalizes what the remote returns into
//! [`RemoteState`].

use super::error::{WorkbookError, WorkbookResult};
use super::hidden_link;
use super::identity::ResourceId;
use super::model::{normalize_location, RemoteState, Workbook, WorkbookKind};
use super::remote::{Lookup, RemoteClient};

pub struct Reader<C> {
    client: C,
}

impl<C: RemoteClient> Reader<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Read the workbook behind `identity`
    ///
    /// `Ok(None)` means the workbook no longer exists; callers should drop
    /// the identity they hold.
    pub async fn read(&self, identity: &str) -> WorkbookResult<Option<RemoteState>> {
        let id = ResourceId::parse(identity)?;
        tracing::debug!("Reading Application Insights Workbook {:?}", identity);

        let name = id.path_value("workbooks").unwrap_or_else(|| id.name());
        self.read_by_name(&id.resource_group, name).await
    }

    /// Read by resource group and name
    pub async fn read_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> WorkbookResult<Option<RemoteState>> {
        let lookup = self
            .client
            .get_by_name(resource_group, name)
            .await
            .map_err(|source| WorkbookError::Read {
                name: name.to_string(),
                resource_group: resource_group.to_string(),
                source,
            })?;

        match lookup {
            Lookup::Found(workbook) => Ok(Some(normalize(*workbook, resource_group, name))),
            Lookup::NotFound => {
                tracing::debug!(
                    "Application Insights Workbook {:?} was not found in Resource Group {:?}",
                    name,
                    resource_group
                );
                Ok(None)
            }
        }
    }
}

/// Project a wire workbook into [`RemoteState`]
pub fn normalize(workbook: Workbook, resource_group: &str, name: &str) -> RemoteState {
    let props = workbook.properties.unwrap_or_default();

    // The top-level kind is sometimes returned empty; the properties block
    // then holds the real value
    let raw_kind = workbook
        .kind
        .filter(|k| !k.is_empty())
        .or_else(|| props.kind.clone().filter(|k| !k.is_empty()));
    let kind = raw_kind.and_then(|k| match k.parse::<WorkbookKind>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            tracing::warn!("Ignoring unknown workbook kind {:?} on {:?}", k, name);
            None
        }
    });

    let tags = workbook.tags.unwrap_or_default();
    let parent_resource_id = hidden_link::decode(&tags);

    RemoteState {
        identity: workbook.id.unwrap_or_default(),
        name: workbook.name.unwrap_or_else(|| name.to_string()),
        resource_group: resource_group.to_string(),
        location: workbook.location.as_deref().map(normalize_location),
        kind,
        parent_resource_id,
        tags: hidden_link::strip(&tags),
        serialized_data: props.serialized_data,
        version: props.version,
        workbook_id: props.workbook_id,
        category: props.category,
        labels: props.tags.unwrap_or_default(),
        user_id: props.user_id,
        source_resource_id: props.source_resource_id,
        time_modified: props.time_modified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::model::WorkbookProperties;
    use crate::workbook::testing::{identity_for, Fail, StubClient};
    use reqwest::StatusCode;
    use std::collections::BTreeMap;

    fn remote_workbook(kind: &str, props_kind: &str) -> Workbook {
        let mut tags = BTreeMap::new();
        tags.insert("Hello".to_string(), "World".to_string());
        tags.insert(
            "hidden-link:/subscriptions/S/resourceGroups/rg1/providers/ns/components/app1"
                .to_string(),
            "Resource".to_string(),
        );

        Workbook {
            id: Some(identity_for("rg1", "wb1")),
            name: Some("wb1".to_string()),
            location: Some("West Europe".to_string()),
            kind: Some(kind.to_string()),
            tags: Some(tags),
            properties: Some(WorkbookProperties {
                name: Some("wb1".to_string()),
                serialized_data: Some("{}".to_string()),
                version: Some("1.0".to_string()),
                workbook_id: Some("11111111-1111-1111-1111-111111111111".to_string()),
                kind: Some(props_kind.to_string()),
                category: Some("workbook".to_string()),
                tags: Some(vec!["tag1".to_string()]),
                user_id: Some("22222222-2222-2222-2222-222222222222".to_string()),
                source_resource_id: Some("/path/to/resource/id".to_string()),
                time_modified: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_read_normalizes_state() {
        let stub = StubClient::new().with("rg1", "wb1", remote_workbook("user", "user"));
        let reader = Reader::new(&stub);

        let state = reader.read(&identity_for("rg1", "wb1")).await.unwrap().unwrap();

        assert_eq!(state.identity, identity_for("rg1", "wb1"));
        assert_eq!(state.name, "wb1");
        assert_eq!(state.resource_group, "rg1");
        assert_eq!(state.location.as_deref(), Some("westeurope"));
        assert_eq!(state.kind, Some(WorkbookKind::User));
        assert_eq!(
            state.parent_resource_id.as_deref(),
            Some("/subscriptions/S/resourceGroups/rg1/providers/ns/components/app1")
        );
        assert_eq!(state.tags.len(), 1);
        assert_eq!(state.tags["Hello"], "World");
        assert_eq!(state.labels, vec!["tag1".to_string()]);
        assert_eq!(state.source_resource_id.as_deref(), Some("/path/to/resource/id"));
    }

    #[tokio::test]
    async fn test_read_falls_back_to_properties_kind() {
        let stub = StubClient::new().with("rg1", "wb1", remote_workbook("", "shared"));
        let reader = Reader::new(&stub);

        let state = reader.read(&identity_for("rg1", "wb1")).await.unwrap().unwrap();
        assert_eq!(state.kind, Some(WorkbookKind::Shared));
    }

    #[tokio::test]
    async fn test_read_not_found_is_none() {
        let stub = StubClient::new();
        let reader = Reader::new(&stub);

        let state = reader.read(&identity_for("rg1", "gone")).await.unwrap();
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_read_surfaces_other_failures() {
        let stub = StubClient::new().failing(Fail::Get(StatusCode::FORBIDDEN));
        let reader = Reader::new(&stub);

        let err = reader.read(&identity_for("rg1", "wb1")).await.unwrap_err();
        match err {
            WorkbookError::Read {
                name,
                resource_group,
                source,
            } => {
                assert_eq!(name, "wb1");
                assert_eq!(resource_group, "rg1");
                assert_eq!(source.status(), Some(StatusCode::FORBIDDEN));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_rejects_malformed_identity() {
        let stub = StubClient::new();
        let reader = Reader::new(&stub);

        let err = reader.read("wb1").await.unwrap_err();
        assert!(matches!(err, WorkbookError::MalformedIdentity { .. }));
    }

    #[test]
    fn test_normalize_without_link_or_properties() {
        let workbook = Workbook {
            id: Some(identity_for("rg1", "bare")),
            ..Default::default()
        };

        let state = normalize(workbook, "rg1", "bare");
        assert_eq!(state.name, "bare");
        assert_eq!(state.parent_resource_id, None);
        assert_eq!(state.kind, None);
        assert!(state.tags.is_empty());
    }
}
