//! Existence guard
//!
//! Stops a first-time create from silently adopting a workbook that already
//! exists under the same name.

use super::error::{WorkbookError, WorkbookResult};
use super::reader::Reader;
use super::remote::RemoteClient;

pub struct ExistenceGuard<C> {
    reader: Reader<C>,
}

impl<C: RemoteClient> ExistenceGuard<C> {
    pub fn new(client: C) -> Self {
        Self {
            reader: Reader::new(client),
        }
    }

    /// Fail with `AlreadyExists` if `name` is present in `resource_group`
    ///
    /// Read failures other than not-found are returned as-is; they never
    /// count as absence.
    pub async fn check_not_exists(&self, resource_group: &str, name: &str) -> WorkbookResult<()> {
        match self.reader.read_by_name(resource_group, name).await? {
            Some(existing) if !existing.identity.is_empty() => {
                tracing::info!(
                    "Workbook {:?} already exists in Resource Group {:?}",
                    name,
                    resource_group
                );
                Err(WorkbookError::AlreadyExists {
                    identity: existing.identity,
                })
            }
            _ => Ok(()),
        }
    }
}
