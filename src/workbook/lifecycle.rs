//! Workbooks facade
//!
//! Wires the reconciler, reader and deleter around one client and adds the
//! read-after-write step every mutation is followed by.

use super::deleter::Deleter;
use super::error::WorkbookResult;
use super::model::{DesiredState, RemoteState};
use super::reader::Reader;
use super::reconciler::Reconciler;
use super::remote::RemoteClient;

/// Result of [`Workbooks::apply`]
#[derive(Debug, Clone)]
pub struct Applied {
    pub identity: String,
    /// Fresh read after the write; `None` if the workbook was not yet visible
    pub state: Option<RemoteState>,
}

pub struct Workbooks<C> {
    reconciler: Reconciler<C>,
    reader: Reader<C>,
    deleter: Deleter<C>,
}

impl<C: RemoteClient + Clone> Workbooks<C> {
    pub fn new(client: C) -> Self {
        Self {
            reconciler: Reconciler::new(client.clone()),
            reader: Reader::new(client.clone()),
            deleter: Deleter::new(client),
        }
    }

    /// Validate, reconcile, then read back the stored state
    pub async fn apply(
        &self,
        desired: &DesiredState,
        existing: Option<&str>,
    ) -> WorkbookResult<Applied> {
        desired.validate()?;
        let identity = self.reconciler.reconcile(desired, existing).await?;

        let state = self.reader.read(&identity).await?;
        if state.is_none() {
            tracing::warn!("Workbook {:?} not visible right after write", identity);
        }

        Ok(Applied { identity, state })
    }

    pub async fn read(&self, identity: &str) -> WorkbookResult<Option<RemoteState>> {
        self.reader.read(identity).await
    }

    pub async fn delete(&self, identity: &str) -> WorkbookResult<()> {
        self.deleter.delete(identity).await
    }

    /// Read an existing workbook and express it as a manifest
    pub async fn import(&self, identity: &str) -> WorkbookResult<Option<(RemoteState, DesiredState)>> {
        let Some(state) = self.reader.read(identity).await? else {
            return Ok(None);
        };
        let desired = state.to_desired()?;
        Ok(Some((state, desired)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::model::WorkbookKind;
    use crate::workbook::testing::{desired, StubClient};
    use crate::workbook::WorkbookError;

    #[tokio::test]
    async fn test_end_to_end_lifecycle() {
        let stub = StubClient::new();
        let workbooks = Workbooks::new(&stub);

        let mut state = desired();
        state.tags.insert("Hello".to_string(), "World".to_string());

        let applied = workbooks.apply(&state, None).await.unwrap();
        assert_eq!(
            applied.identity,
            "/subscriptions/S/resourceGroups/rg1/providers/ns/workbooks/wb1"
        );

        let read = applied.state.unwrap();
        assert_eq!(read.kind, Some(WorkbookKind::Shared));
        assert_eq!(read.parent_resource_id.as_deref(), Some(state.parent_resource_id.as_str()));
        assert_eq!(read.tags, state.tags);

        let (_, imported) = workbooks.import(&applied.identity).await.unwrap().unwrap();
        assert_eq!(imported, state);

        workbooks.delete(&applied.identity).await.unwrap();
        assert!(workbooks.read(&applied.identity).await.unwrap().is_none());
        assert!(workbooks.import(&applied.identity).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply_reads_back_declared_parent() {
        let stub = StubClient::new();
        let workbooks = Workbooks::new(&stub);

        let mut state = desired();
        state.tags.insert(
            "hidden-link:/subscriptions/S/resourceGroups/rg1/providers/ns/components/aaa".to_string(),
            "Resource".to_string(),
        );

        let applied = workbooks.apply(&state, None).await.unwrap();
        let read = applied.state.unwrap();
        assert_eq!(read.parent_resource_id.as_deref(), Some(state.parent_resource_id.as_str()));
        assert!(read.tags.is_empty());
    }

    #[tokio::test]
    async fn test_apply_validates_before_writing() {
        let stub = StubClient::new();
        let workbooks = Workbooks::new(&stub);

        let mut state = desired();
        state.serialized_data = "not json".to_string();

        let err = workbooks.apply(&state, None).await.unwrap_err();
        assert!(matches!(err, WorkbookError::Invalid { field: "serialized_data", .. }));
        assert_eq!(stub.write_count(), 0);
    }
}
