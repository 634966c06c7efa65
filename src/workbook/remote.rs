//! Remote client capability consumed by the lifecycle components
//!
//! Components receive a `RemoteClient` in their constructor; nothing reaches
//! for a process-wide client. Retries, auth and transport concerns live on
//! the implementation side.

use super::model::Workbook;
use crate::azure::ApiError;
use reqwest::StatusCode;
use std::future::Future;
use std::sync::Arc;

/// Outcome of a lookup by name
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Box<Workbook>),
    NotFound,
}

pub trait RemoteClient: Send + Sync {
    /// Subscription every request is scoped to
    fn subscription_id(&self) -> &str;

    fn get_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<Lookup, ApiError>> + Send;

    /// Insert or replace a workbook; the response carries the identity
    fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        workbook: &Workbook,
    ) -> impl Future<Output = Result<Workbook, ApiError>> + Send;

    /// Returns the HTTP status of the delete, including 404
    fn delete_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<StatusCode, ApiError>> + Send;
}

impl<T: RemoteClient + ?Sized> RemoteClient for &T {
    fn subscription_id(&self) -> &str {
        (**self).subscription_id()
    }

    fn get_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<Lookup, ApiError>> + Send {
        (**self).get_by_name(resource_group, name)
    }

    fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        workbook: &Workbook,
    ) -> impl Future<Output = Result<Workbook, ApiError>> + Send {
        (**self).create_or_update(resource_group, name, workbook)
    }

    fn delete_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<StatusCode, ApiError>> + Send {
        (**self).delete_by_name(resource_group, name)
    }
}

impl<T: RemoteClient + ?Sized> RemoteClient for Arc<T> {
    fn subscription_id(&self) -> &str {
        (**self).subscription_id()
    }

    fn get_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<Lookup, ApiError>> + Send {
        (**self).get_by_name(resource_group, name)
    }

    fn create_or_update(
        &self,
        resource_group: &str,
        name: &str,
        workbook: &Workbook,
    ) -> impl Future<Output = Result<Workbook, ApiError>> + Send {
        (**self).create_or_update(resource_group, name, workbook)
    }

    fn delete_by_name(
        &self,
        resource_group: &str,
        name: &str,
    ) -> impl Future<Output = Result<StatusCode, ApiError>> + Send {
        (**self).delete_by_name(resource_group, name)
    }
}
