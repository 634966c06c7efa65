//! Error types for workbook lifecycle operations.

use crate::azure::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("malformed resource identity {identity:?}: {reason}")]
    MalformedIdentity { identity: String, reason: String },

    #[error(
        "a resource with the ID {identity:?} already exists - to be managed by azwb it needs to be imported (`azwb import {identity}`)"
    )]
    AlreadyExists { identity: String },

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("error creating Application Insights Workbook {name:?} (Resource Group {resource_group:?}): {source}")]
    Remote {
        name: String,
        resource_group: String,
        #[source]
        source: ApiError,
    },

    #[error("error reading Application Insights Workbook {name:?} (Resource Group {resource_group:?}): {source}")]
    Read {
        name: String,
        resource_group: String,
        #[source]
        source: ApiError,
    },

    #[error("error deleting Application Insights Workbook {name:?} (Resource Group {resource_group:?}): {source}")]
    Delete {
        name: String,
        resource_group: String,
        #[source]
        source: ApiError,
    },
}

impl WorkbookError {
    pub(crate) fn malformed(identity: &str, reason: impl Into<String>) -> Self {
        WorkbookError::MalformedIdentity {
            identity: identity.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        WorkbookError::Invalid {
            field,
            reason: reason.into(),
        }
    }

    /// The remote failure underneath, if any
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            WorkbookError::Remote { source, .. }
            | WorkbookError::Read { source, .. }
            | WorkbookError::Delete { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type WorkbookResult<T> = Result<T, WorkbookError>;
