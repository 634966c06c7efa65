//! In-memory `RemoteClient` used by the unit tests

use super::model::{DesiredState, Workbook, WorkbookKind};
use super::remote::{Lookup, RemoteClient};
use crate::azure::ApiError;
use reqwest::StatusCode;
use std::collections::BTreeMap;
use std::sync::Mutex;
use uuid::Uuid;

pub(crate) const SUBSCRIPTION: &str = "S";

pub(crate) fn desired() -> DesiredState {
    DesiredState {
        name: "wb1".to_string(),
        resource_group: "rg1".to_string(),
        parent_resource_id: "/subscriptions/S/resourceGroups/rg1/providers/ns/components/app1"
            .to_string(),
        location: "westeurope".to_string(),
        kind: Some(WorkbookKind::Shared),
        serialized_data: "{}".to_string(),
        version: None,
        workbook_id: Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
        category: "workbook".to_string(),
        labels: vec![],
        user_id: Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap(),
        source_resource_id: None,
        tags: BTreeMap::new(),
    }
}

pub(crate) fn identity_for(resource_group: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/ns/workbooks/{}",
        SUBSCRIPTION, resource_group, name
    )
}

/// Failure to inject into the next calls
#[derive(Clone, Copy)]
pub(crate) enum Fail {
    Get(StatusCode),
    Put(StatusCode),
    Delete(StatusCode),
    /// delete_by_name answers with this status instead of erroring
    DeleteStatus(StatusCode),
}

#[derive(Default)]
pub(crate) struct StubClient {
    pub workbooks: Mutex<BTreeMap<(String, String), Workbook>>,
    pub writes: Mutex<Vec<Workbook>>,
    pub deletes: Mutex<Vec<(String, String)>>,
    pub fail: Mutex<Option<Fail>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, resource_group: &str, name: &str, workbook: Workbook) -> Self {
        self.workbooks
            .lock()
            .unwrap()
            .insert((resource_group.to_string(), name.to_string()), workbook);
        self
    }

    pub fn failing(self, fail: Fail) -> Self {
        *self.fail.lock().unwrap() = Some(fail);
        self
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn last_write(&self) -> Option<Workbook> {
        self.writes.lock().unwrap().last().cloned()
    }

    fn status_error(status: StatusCode) -> ApiError {
        ApiError::Status {
            status,
            code: None,
            message: None,
        }
    }
}

impl RemoteClient for StubClient {
    fn subscription_id(&self) -> &str {
        SUBSCRIPTION
    }

    async fn get_by_name(&self, resource_group: &str, name: &str) -> Result<Lookup, ApiError> {
        if let Some(Fail::Get(status)) = *self.fail.lock().unwrap() {
            return Err(Self::status_error(status));
        }
        let workbooks = self.workbooks.lock().unwrap();
        Ok(
            match workbooks.get(&(resource_group.to_string(), name.to_string())) {
                Some(workbook) => Lookup::Found(Box::new(workbook.clone())),
                None => Lookup::NotFound,
            },
        )
    }

    async fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        workbook: &Workbook,
    ) -> Result<Workbook, ApiError> {
        if let Some(Fail::Put(status)) = *self.fail.lock().unwrap() {
            return Err(Self::status_error(status));
        }
        self.writes.lock().unwrap().push(workbook.clone());

        let mut stored = workbook.clone();
        stored.id = Some(identity_for(resource_group, name));
        self.workbooks
            .lock()
            .unwrap()
            .insert((resource_group.to_string(), name.to_string()), stored.clone());
        Ok(stored)
    }

    async fn delete_by_name(&self, resource_group: &str, name: &str) -> Result<StatusCode, ApiError> {
        match *self.fail.lock().unwrap() {
            Some(Fail::Delete(status)) => return Err(Self::status_error(status)),
            Some(Fail::DeleteStatus(status)) => return Ok(status),
            _ => {}
        }
        self.deletes
            .lock()
            .unwrap()
            .push((resource_group.to_string(), name.to_string()));

        let removed = self
            .workbooks
            .lock()
            .unwrap()
            .remove(&(resource_group.to_string(), name.to_string()));
        Ok(match removed {
            Some(_) => StatusCode::OK,
            None => StatusCode::NOT_FOUND,
        })
    }
}
