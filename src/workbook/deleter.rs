//! Deleter

use super::error::{WorkbookError, WorkbookResult};
use super::identity::ResourceId;
use super::remote::RemoteClient;
use crate::azure::ApiError;
use reqwest::StatusCode;

pub struct Deleter<C> {
    client: C,
}

impl<C: RemoteClient> Deleter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Delete the workbook behind `identity`; an already absent workbook is success
    pub async fn delete(&self, identity: &str) -> WorkbookResult<()> {
        let id = ResourceId::parse(identity)?;
        let resource_group = id.resource_group.as_str();
        let name = id.path_value("workbooks").unwrap_or_else(|| id.name());

        tracing::debug!(
            "Deleting Application Insights Workbook {:?} (Resource Group {:?})",
            name,
            resource_group
        );

        let delete_error = |source| WorkbookError::Delete {
            name: name.to_string(),
            resource_group: resource_group.to_string(),
            source,
        };

        let status = match self.client.delete_by_name(resource_group, name).await {
            Ok(status) => status,
            Err(err) if err.is_not_found() => StatusCode::NOT_FOUND,
            Err(err) => return Err(delete_error(err)),
        };

        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Workbook {:?} was already absent", name);
            return Ok(());
        }
        if !status.is_success() {
            return Err(delete_error(ApiError::Status {
                status,
                code: None,
                message: None,
            }));
        }

        tracing::info!(
            "Deleted Application Insights Workbook {:?} (Resource Group {:?})",
            name,
            resource_group
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::model::Workbook;
    use crate::workbook::testing::{identity_for, Fail, StubClient};

    #[tokio::test]
    async fn test_delete_existing() {
        let stub = StubClient::new().with("rg1", "wb1", Workbook::default());
        let deleter = Deleter::new(&stub);

        deleter.delete(&identity_for("rg1", "wb1")).await.unwrap();
        assert_eq!(
            *stub.deletes.lock().unwrap(),
            vec![("rg1".to_string(), "wb1".to_string())]
        );
        assert!(stub.workbooks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_absent_is_ok() {
        let stub = StubClient::new();
        let deleter = Deleter::new(&stub);

        tokio_test::assert_ok!(deleter.delete(&identity_for("rg1", "gone")).await);
    }

    #[tokio::test]
    async fn test_delete_not_found_error_is_ok() {
        let stub = StubClient::new().failing(Fail::Delete(StatusCode::NOT_FOUND));
        let deleter = Deleter::new(&stub);

        assert!(deleter.delete(&identity_for("rg1", "wb1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_failure_status() {
        let stub = StubClient::new().failing(Fail::DeleteStatus(StatusCode::CONFLICT));
        let deleter = Deleter::new(&stub);

        let err = deleter.delete(&identity_for("rg1", "wb1")).await.unwrap_err();
        match err {
            WorkbookError::Delete {
                name,
                resource_group,
                source,
            } => {
                assert_eq!(name, "wb1");
                assert_eq!(resource_group, "rg1");
                assert_eq!(source.status(), Some(StatusCode::CONFLICT));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_server_error() {
        let stub = StubClient::new().failing(Fail::Delete(StatusCode::INTERNAL_SERVER_ERROR));
        let deleter = Deleter::new(&stub);

        let err = deleter.delete(&identity_for("rg1", "wb1")).await.unwrap_err();
        assert!(matches!(err, WorkbookError::Delete { .. }));
    }

    #[tokio::test]
    async fn test_delete_rejects_malformed_identity() {
        let stub = StubClient::new();
        let deleter = Deleter::new(&stub);

        let err = deleter.delete("/subscriptions/S").await.unwrap_err();
        assert!(matches!(err, WorkbookError::MalformedIdentity { .. }));
        assert!(stub.deletes.lock().unwrap().is_empty());
    }
}
